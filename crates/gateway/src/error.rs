use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Channel(#[from] waterline_channels::Error),

    #[error(transparent)]
    Watermark(#[from] waterline_watermark::Error),
}

impl Error {
    /// Only channel-side delivery failures are worth retrying; ownership
    /// misconfiguration and corrupt state are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Channel(e) => e.is_transient(),
            Self::Watermark(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_only_for_delivery_failures() {
        let offline: Error = waterline_channels::Error::disconnected("tg:1", "telegram").into();
        assert!(offline.is_transient());

        let unowned: Error = waterline_channels::Error::no_owner("x").into();
        assert!(!unowned.is_transient());

        let corrupt: Error =
            waterline_watermark::Error::corrupt_state("last_agent_timestamp", "not json").into();
        assert!(!corrupt.is_transient());
        assert_eq!(
            corrupt.to_string(),
            "corrupt router state under 'last_agent_timestamp': not json"
        );
    }
}
