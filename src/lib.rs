pub mod booking;
pub mod catalog;
pub mod configuration;
pub mod coupons;
pub mod database;
pub mod domain;
pub mod email_client;
pub mod models;
pub mod notifications;
pub mod notifier;
pub mod routes;
pub mod schema;
pub mod sms_client;
pub mod startup;
pub mod telemetry;
pub mod utils;

use once_cell::sync::Lazy;
use tera::Tera;

/// HTML email templates. A broken template directory leaves this empty and
/// every render fails, which only costs the HTML confirmation.
pub static TEMPLATES: Lazy<Tera> =
    Lazy::new(|| match Tera::new("templates/**/*.html") {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Tera parsing error(s): {}", e);
            Tera::default()
        }
    });
