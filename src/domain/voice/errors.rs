//! Voice Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Invalid gender: {0} (expected male, female or neutral)")]
    InvalidGender(String),

    #[error("Invalid speed: {0} (expected 0.5 to 2.0)")]
    InvalidSpeed(f32),

    #[error("Invalid voice name: {0}")]
    InvalidName(String),

    #[error("Invalid voice sample path: {0}")]
    InvalidFilePath(String),

    #[error("Invalid language: {0}")]
    InvalidLanguage(String),
}
