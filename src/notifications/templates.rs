use serde::Serialize;

use crate::config::Config;
use crate::domain::aggregates::{Address, Order};
use crate::domain::value_objects::format_decimal;

const SHOP_NAME: &str = "Lekker Purmerend";
const PICKUP_ADDRESS: [&str; 3] = ["Lekker Purmerend", "Huidenstraat 123", "1441 HZ Purmerend"];
const CONTACT_EMAIL: &str = "info@lekkerpurmerend.nl";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmailTemplate {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Shop identity used in outgoing mail.
#[derive(Clone, Debug)]
pub struct ShopDetails {
    pub from: String,
    pub owner_email: String,
    pub site_url: String,
}

impl ShopDetails {
    pub fn from_config(config: &Config) -> Self {
        Self { from: config.mail.from.clone(), owner_email: config.mail.owner.clone(), site_url: config.site_url.clone() }
    }

    pub fn from_header(&self) -> String { format!("\"{SHOP_NAME}\" <{}>", self.from) }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self { from: "info@lekker.test".into(), owner_email: "owner@lekker.test".into(), site_url: "https://lekker.test".into() }
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Address lines joined with `<br>`; empty parts are left out.
pub fn format_address(address: Option<&Address>) -> String {
    let Some(a) = address else { return String::new() };
    let postal_city = format!("{} {}", a.postal_code.as_deref().unwrap_or(""), a.city.as_deref().unwrap_or(""));
    [
        a.address_1.clone(),
        a.address_2.clone(),
        Some(postal_city.trim().to_string()),
        a.country_code.as_deref().map(str::to_uppercase),
    ]
    .into_iter()
    .flatten()
    .filter(|line| !line.is_empty())
    .map(|line| escape(&line))
    .collect::<Vec<_>>()
    .join("<br>")
}

fn eta_text(order: &Order) -> String {
    let label = order.metadata_str("eta_label").unwrap_or("Binnenkort");
    let range = order.metadata_str("eta_range").unwrap_or("");
    escape(format!("{label} {range}").trim())
}

pub fn render_order_confirmation(order: &Order, shop: &ShopDetails) -> EmailTemplate {
    let display = order.display_ref();
    let name = order.customer_name();
    let greeting = if name.is_empty() { "klant".to_string() } else { escape(&name) };

    let location = if order.is_delivery() {
        format!("<p><strong>Bezorgadres:</strong><br>{}</p>", format_address(order.shipping_address.as_ref()))
    } else {
        format!("<p><strong>Ophaaladres:</strong><br>{}</p>", PICKUP_ADDRESS.join("<br>"))
    };

    let rows: String = order.items.iter().map(|item| {
        format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(&item.title), item.quantity, order.line_total(item)
        )
    }).collect();

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="nl">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Bedankt voor je bestelling!</title>
  <style>
    body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
    .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
    .header {{ background: #2563eb; color: white; padding: 20px; text-align: center; border-radius: 8px 8px 0 0; }}
    .content {{ background: #f9fafb; padding: 20px; border-radius: 0 0 8px 8px; }}
    .order-info {{ background: white; padding: 15px; border-radius: 8px; margin: 20px 0; border: 1px solid #e5e7eb; }}
    .items-table {{ width: 100%; border-collapse: collapse; margin: 20px 0; }}
    .items-table th, .items-table td {{ padding: 12px; text-align: left; border-bottom: 1px solid #e5e7eb; }}
    .highlight {{ color: #2563eb; font-weight: 600; }}
    .footer {{ text-align: center; margin-top: 30px; padding-top: 20px; border-top: 1px solid #e5e7eb; color: #6b7280; }}
  </style>
</head>
<body>
  <div class="container">
    <div class="header">
      <h1>Bedankt voor je bestelling!</h1>
      <p>We gaan er direct mee aan de slag 🍰</p>
    </div>
    <div class="content">
      <p>Beste {greeting},</p>
      <p>We hebben je bestelling ontvangen en bereiden alles vers voor je voor.</p>
      <div class="order-info">
        <h3>📋 Bestelgegevens</h3>
        <p><strong>Bestelnummer:</strong> <span class="highlight">#{display}</span></p>
        <p><strong>Klaar voor:</strong> <span class="highlight">{eta}</span></p>
        <p><strong>Methode:</strong> {method}</p>
        {location}
      </div>
      <h3>🛒 Je bestelling</h3>
      <table class="items-table">
        <thead><tr><th>Product</th><th>Aantal</th><th>Prijs</th></tr></thead>
        <tbody>
{rows}        </tbody>
        <tfoot><tr><td colspan="2"><strong>Totaal</strong></td><td><strong>{total}</strong></td></tr></tfoot>
      </table>
      <div class="footer">
        <p>Heb je vragen? Neem gerust contact met ons op!</p>
        <p><strong>{SHOP_NAME}</strong> | {CONTACT_EMAIL} | <a href="{site}">{site}</a></p>
      </div>
    </div>
  </div>
</body>
</html>"#,
        display = escape(&display),
        eta = eta_text(order),
        method = escape(order.delivery_method()),
        total = order.total_money(),
        site = shop.site_url,
    );

    EmailTemplate { to: order.recipient().to_string(), subject: format!("Bestelling bevestiging - #{display}"), html }
}

pub fn render_owner_notification(order: &Order, shop: &ShopDetails) -> EmailTemplate {
    let display = order.display_ref();
    let customer = order.customer.as_ref();
    let first = customer.and_then(|c| c.first_name.as_deref()).unwrap_or("");
    let last = customer.and_then(|c| c.last_name.as_deref()).unwrap_or("");
    let phone = order.shipping_address.as_ref().and_then(|a| a.phone.as_deref()).unwrap_or("Niet opgegeven");

    let items: String = order.items.iter().map(|item| {
        let note = item.note().map(|n| format!(" ({})", escape(n))).unwrap_or_default();
        format!("<li>{}x {}{note}</li>\n", item.quantity, escape(&item.title))
    }).collect();

    let html = format!(
        r#"<h2>Nieuwe bestelling ontvangen! 🎉</h2>
<p><strong>Bestelnummer:</strong> #{display}</p>
<p><strong>Klant:</strong> {name} ({email})</p>
<p><strong>Telefoon:</strong> {phone}</p>
<p><strong>ETA:</strong> {eta}</p>
<p><strong>Methode:</strong> {method}</p>

<h3>Items:</h3>
<ul>
{items}</ul>

<p><strong>Totaal:</strong> €{total}</p>
<p><strong>Print link:</strong> <a href="{site}/orders/{id}/print">Bestelbon printen</a></p>
"#,
        display = escape(&display),
        name = escape(format!("{first} {last}").trim()),
        email = escape(&order.email),
        phone = escape(phone),
        eta = eta_text(order),
        method = escape(order.delivery_method()),
        total = format_decimal(order.total),
        site = shop.site_url,
        id = escape(&order.id),
    );

    EmailTemplate { to: shop.owner_email.clone(), subject: format!("Nieuwe bestelling - #{display}"), html }
}
