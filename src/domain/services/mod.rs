//! Domain services
pub mod delivery;
pub mod fulfillment;
pub mod locality;

pub use delivery::{calculate_eta, order_estimate, DeliveryEstimate, DeliveryEstimationService, SHOP_TIMEZONE};
pub use fulfillment::{
    available_payment_methods, payment_allowed, shipping_options, storefront_payment_methods, DeliveryMethod,
    PaymentMethodOption, ShippingOption, StorefrontPaymentMethod,
};
pub use locality::{detect_purmerend, DetectionReason, PurmerendDetection};
