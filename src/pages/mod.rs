//! Page objects for the demo storefront. Every page composes a `Wait` engine
//! and an `Interactor` instead of inheriting from a page base class.

pub mod login;

pub use login::LoginPage;
