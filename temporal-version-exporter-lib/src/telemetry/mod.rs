pub mod health;
pub mod metrics;
pub mod metrics_handler;
pub mod server;
pub mod tracing;
pub mod version_state;

pub use health::health_check_response;
pub use metrics::{init_metrics, Metrics};
pub use metrics_handler::{encode_metrics, handle_metrics};
pub use server::{bind_metrics_listener, serve_metrics};
pub use self::tracing::init_tracing;
pub use version_state::{transition, Indicator, StaleSeriesPolicy, Transition, VersionState};
