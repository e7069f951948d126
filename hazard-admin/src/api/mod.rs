//! HTTP handlers for hazard-admin
//!
//! Each route has separate `load_*` (GET) and `submit_*` (POST) handlers.

pub mod hazard_category;
pub mod health;
pub mod index;
pub mod technical_rec;

pub use hazard_category::{load_hazard_category_form, submit_hazard_category_form};
pub use health::health_routes;
pub use index::admin_index;
pub use technical_rec::{
    list_technical_recs, load_edit_technical_rec_form, load_new_technical_rec_form,
    submit_edit_technical_rec, submit_new_technical_rec,
};
