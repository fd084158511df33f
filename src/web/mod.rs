pub mod admin;
pub mod categories;
pub mod places;
pub mod ratings;
pub mod words;

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Route resolution stops at the first match, so the more specific
    // place routes register before the catch-all slug route.
    admin::configure(conf);
    words::configure(conf);
    categories::configure(conf);
    ratings::configure(conf);
    places::configure(conf);
}
