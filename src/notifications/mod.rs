//! Order e-mails: rendering and delivery.

mod templates;

pub use templates::{format_address, render_order_confirmation, render_owner_notification, EmailTemplate, ShopDetails};

use async_trait::async_trait;
use tracing::info;

use crate::domain::aggregates::Order;
use crate::error::Result;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, from: &str, template: &EmailTemplate) -> Result<()>;
}

/// Records outgoing mail in the log instead of handing it to a transport.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, from: &str, template: &EmailTemplate) -> Result<()> {
        info!(from, to = %template.to, subject = %template.subject, bytes = template.html.len(), "email queued");
        Ok(())
    }
}

/// Sends the customer confirmation and the owner notification for an order.
pub async fn send_order_emails(mailer: &dyn Mailer, shop: &ShopDetails, order: &Order) -> Result<()> {
    mailer.send(&shop.from_header(), &render_order_confirmation(order, shop)).await?;
    mailer.send(&shop.from_header(), &render_owner_notification(order, shop)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Outbox;

    #[tokio::test]
    async fn sends_customer_and_owner_mail() {
        let order: Order = serde_json::from_value(serde_json::json!({"id": "order_1", "display_id": 12, "email": "anna@example.com"})).unwrap();
        let outbox = Outbox::default();
        send_order_emails(&outbox, &ShopDetails::for_tests(), &order).await.unwrap();
        let sent = outbox.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "anna@example.com");
        assert_eq!(sent[1].to, "owner@lekker.test");
        assert_eq!(sent[1].subject, "Nieuwe bestelling - #12");
    }
}
