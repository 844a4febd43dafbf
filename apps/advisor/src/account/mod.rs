// Student account: signup, login, the dev login bypass, logout, and the profile page.
// Identity lives in the session store; the backend owns the accounts.

pub mod auth;
pub mod handlers;
pub mod profile;
