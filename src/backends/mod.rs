#[cfg(feature = "google")]
pub mod google;

#[cfg(feature = "groq")]
pub mod groq;
