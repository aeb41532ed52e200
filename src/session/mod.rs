//! Long-lived client state shared by every command: who is signed in, how
//! the UI looks, and which toasts are showing.

pub mod auth;
pub mod notifications;
pub mod theme;

pub use auth::{AuthSession, AuthState, LOGIN_ROUTE};
pub use notifications::{Notification, NotificationCenter, NotificationPosition, ToastVariant};
pub use theme::{
    ColorSchemeProbe, EnvColorScheme, FixedColorScheme, Subscription, ThemeState, WidthMode,
};
