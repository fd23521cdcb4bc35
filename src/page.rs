use crate::cart::CartData;

/// The strategy-specific half of the page: what the submit handler does once
/// the required fields are filled in.
#[derive(Debug, Clone, Copy)]
pub enum SubmitAction<'a> {
    /// Notify the shop, then navigate to the precomputed pay link.
    StaticLink { pay_link: &'a str },
    /// Ask the server for a hosted session and navigate to its redirect URL.
    HostedSession { return_url: &'a str },
}

const CHECKOUT_PAGE: &str = r##"<!DOCTYPE html>
<html lang="nl">
  <head>
    <title>Afrekenen - €__AMOUNT__</title>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
      * { box-sizing: border-box; margin: 0; padding: 0; }
      body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; background: #f7f7f7; color: #333; line-height: 1.6; }
      .checkout-container { display: flex; min-height: 100vh; }
      .order-summary { width: 50%; background: #fafafa; padding: 60px 80px; border-right: 1px solid #e1e1e1; }
      .cart-items { margin-bottom: 30px; }
      .cart-item { display: flex; gap: 15px; margin-bottom: 20px; padding-bottom: 20px; border-bottom: 1px solid #e1e1e1; }
      .item-image { width: 64px; height: 64px; background: #e1e1e1; border-radius: 8px; position: relative; }
      .item-quantity { position: absolute; top: -8px; right: -8px; background: #717171; color: white; width: 22px; height: 22px; border-radius: 50%; display: flex; align-items: center; justify-content: center; font-size: 12px; font-weight: 600; }
      .item-details { flex: 1; }
      .item-name { font-weight: 500; font-size: 14px; }
      .item-price { font-weight: 500; font-size: 14px; }
      .summary-section { padding: 20px 0; border-top: 1px solid #e1e1e1; }
      .summary-row { display: flex; justify-content: space-between; margin-bottom: 12px; font-size: 14px; }
      .summary-row.total { font-size: 18px; font-weight: 600; margin-top: 12px; padding-top: 12px; border-top: 1px solid #e1e1e1; }
      .payment-form { width: 50%; background: white; padding: 60px 80px; }
      .section { margin-bottom: 30px; }
      .section-title { font-size: 16px; font-weight: 600; margin-bottom: 16px; }
      .form-group { margin-bottom: 12px; }
      label { display: block; font-size: 13px; font-weight: 500; margin-bottom: 6px; }
      input { width: 100%; padding: 12px 14px; border: 1px solid #d9d9d9; border-radius: 5px; font-size: 14px; }
      input:focus { outline: none; border-color: #2c6ecb; }
      .form-row { display: flex; gap: 12px; }
      .form-row .form-group { flex: 1; }
      .form-error { margin-top: 16px; padding: 12px 14px; background: #fdecea; border: 1px solid #e74c3c; border-radius: 5px; color: #c0392b; font-size: 14px; }
      .pay-button { width: 100%; padding: 18px; background: #2c6ecb; color: white; border: none; border-radius: 5px; font-size: 16px; font-weight: 600; cursor: pointer; margin-top: 24px; }
      .pay-button:hover { background: #1f5bb5; }
      @media (max-width: 1000px) { .checkout-container { flex-direction: column-reverse; } .order-summary, .payment-form { width: 100%; padding: 30px 20px; } }
    </style>
  </head>
  <body>
    <div class="checkout-container">
      <div class="order-summary">
        <div class="cart-items" id="cart-items"></div>
        <div class="summary-section">
          <div class="summary-row"><span>Subtotaal</span><span>€__AMOUNT__</span></div>
          <div class="summary-row"><span>Verzending</span><span>Gratis</span></div>
          <div class="summary-row total"><span>Totaal</span><span>€__AMOUNT__</span></div>
        </div>
      </div>
      <div class="payment-form">
        <div class="section">
          <div class="section-title">Contact</div>
          <div class="form-group"><label for="email">E-mailadres</label><input type="email" id="email" required></div>
        </div>
        <div class="section">
          <div class="section-title">Bezorgadres</div>
          <div class="form-row">
            <div class="form-group"><label for="firstName">Voornaam</label><input type="text" id="firstName" required></div>
            <div class="form-group"><label for="lastName">Achternaam</label><input type="text" id="lastName" required></div>
          </div>
          <div class="form-group"><label for="address">Adres</label><input type="text" id="address" required></div>
          <div class="form-row">
            <div class="form-group"><label for="postalCode">Postcode</label><input type="text" id="postalCode" required></div>
            <div class="form-group"><label for="city">Plaats</label><input type="text" id="city" required></div>
          </div>
        </div>
        <div id="form-error" class="form-error" style="display: none"></div>
        <button class="pay-button" onclick="startPayment()">Afrekenen</button>
      </div>
    </div>
    <script>
      const cartData = __CART_JSON__;

      function displayCartItems() {
        const container = document.getElementById('cart-items');
        if (!cartData || !cartData.items) {
          container.innerHTML = '<p>Geen producten</p>';
          return;
        }
        container.innerHTML = cartData.items.map(item => `
          <div class="cart-item">
            <div class="item-image"><div class="item-quantity">${item.quantity}</div></div>
            <div class="item-details"><div class="item-name">${item.title || item.product_title}</div></div>
            <div class="item-price">€${(item.price / 100).toFixed(2)}</div>
          </div>
        `).join('');
      }

      function collectCustomerData() {
        return {
          firstName: document.getElementById('firstName').value.trim(),
          lastName: document.getElementById('lastName').value.trim(),
          email: document.getElementById('email').value.trim(),
          address: document.getElementById('address').value.trim(),
          postalCode: document.getElementById('postalCode').value.trim(),
          city: document.getElementById('city').value.trim()
        };
      }

      displayCartItems();

      __SUBMIT_JS__
    </script>
  </body>
</html>
"##;

const STATIC_LINK_SUBMIT_JS: &str = r##"async function startPayment() {
        const customerData = collectCustomerData();
        if (!customerData.firstName || !customerData.email) {
          alert('Vul alle velden in');
          return;
        }

        await fetch('/api/notify', {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify({ amount: '__AMOUNT__', customerData, cartData, orderId: '__ORDER_ID__' })
        });

        window.location.href = '__PAY_LINK__';
      }"##;

const HOSTED_SESSION_SUBMIT_JS: &str = r##"async function startPayment() {
        const customerData = collectCustomerData();
        const errorBox = document.getElementById('form-error');
        errorBox.style.display = 'none';
        if (!customerData.firstName || !customerData.email) {
          errorBox.textContent = 'Vul alle velden in';
          errorBox.style.display = 'block';
          return;
        }

        const response = await fetch('/api/create-payment', {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify({ amount: '__AMOUNT__', customerData, cartData, orderId: '__ORDER_ID__', returnUrl: '__RETURN_URL__' })
        });
        const data = await response.json();
        if (data.url) {
          window.location.href = data.url;
        } else {
          errorBox.textContent = data.message || 'Betaling kon niet worden gestart';
          errorBox.style.display = 'block';
        }
      }"##;

const RETURN_PAGE: &str = r##"<!DOCTYPE html>
<html lang="nl">
  <head>
    <title>Bedankt voor je bestelling</title>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta http-equiv="refresh" content="5;url=__APP_URL__">
    <style>
      body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; background: #f7f7f7; color: #333; display: flex; align-items: center; justify-content: center; min-height: 100vh; margin: 0; }
      .card { background: white; border: 1px solid #e1e1e1; border-radius: 8px; padding: 48px 56px; text-align: center; }
      .card h1 { font-size: 22px; margin-bottom: 12px; }
      .card p { font-size: 14px; color: #717171; }
    </style>
  </head>
  <body>
    <div class="card">
      <h1>Bedankt voor je bestelling!</h1>
      <p>Je betaling wordt verwerkt. Je wordt zo teruggestuurd naar de winkel.</p>
    </div>
  </body>
</html>
"##;

/// Renders the full checkout document. The amount has been validated as a
/// decimal before it gets here; everything else is escaped for the JS string
/// context it lands in.
pub fn render_checkout_page(
    amount: &str,
    order_id: &str,
    cart: Option<&CartData>,
    action: SubmitAction<'_>,
) -> String {
    let cart_json = match cart {
        Some(cart) => serde_json::to_string(cart)
            .unwrap_or_else(|_| "null".to_string())
            .replace("</", "<\\/"),
        None => "null".to_string(),
    };
    let submit_js = match action {
        SubmitAction::StaticLink { pay_link } => {
            STATIC_LINK_SUBMIT_JS.replace("__PAY_LINK__", &js_escape(pay_link))
        }
        SubmitAction::HostedSession { return_url } => {
            HOSTED_SESSION_SUBMIT_JS.replace("__RETURN_URL__", &js_escape(return_url))
        }
    };
    CHECKOUT_PAGE
        .replace("__SUBMIT_JS__", &submit_js)
        .replace("__CART_JSON__", &cart_json)
        .replace("__ORDER_ID__", &js_escape(order_id))
        .replace("__AMOUNT__", amount)
}

/// Post-payment page: always shown, auto-redirects to the service root.
pub fn render_return_page(app_url: &str) -> String {
    RETURN_PAGE.replace("__APP_URL__", app_url)
}

fn js_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace("</", "<\\/")
}
