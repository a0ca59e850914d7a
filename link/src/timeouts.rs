//! Timeout configuration for ksql-link operations.
//!
//! Push queries are open-ended streams, so no whole-request timeout ever
//! applies to them; only an optional idle timeout between received chunks.

use std::time::Duration;

/// Timeout configuration for engine requests.
///
/// # Examples
///
/// ```rust
/// use ksql_link::KsqlLinkTimeouts;
/// use std::time::Duration;
///
/// // Use defaults (recommended for most cases)
/// let timeouts = KsqlLinkTimeouts::default();
///
/// // Fail push queries whose stream stays silent for a minute
/// let timeouts = KsqlLinkTimeouts::builder()
///     .connection_timeout(Duration::from_secs(5))
///     .push_idle_timeout(Duration::from_secs(60))
///     .build();
/// assert_eq!(timeouts.push_idle_timeout, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KsqlLinkTimeouts {
    /// Timeout for establishing connections (TCP + TLS handshake).
    /// Default: 10 seconds
    pub connection_timeout: Duration,

    /// Whole-request timeout for `/ksql` statements and listings.
    /// Default: 30 seconds
    pub request_timeout: Duration,

    /// Maximum wait for the next frame of a push query stream.
    /// Set to 0 to wait indefinitely (push queries can legitimately idle
    /// until new events arrive).
    /// Default: 0 (disabled)
    pub push_idle_timeout: Duration,
}

impl Default for KsqlLinkTimeouts {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            push_idle_timeout: Duration::ZERO,
        }
    }
}

impl KsqlLinkTimeouts {
    pub fn builder() -> KsqlLinkTimeoutsBuilder {
        KsqlLinkTimeoutsBuilder::new()
    }

    /// Short timeouts for a local engine.
    pub fn fast() -> Self {
        Self {
            connection_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(5),
            push_idle_timeout: Duration::ZERO,
        }
    }

    /// Long timeouts for remote or slow clusters.
    pub fn relaxed() -> Self {
        Self {
            connection_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(120),
            push_idle_timeout: Duration::ZERO,
        }
    }

    /// Check if a duration represents "no timeout" (zero or very large).
    pub fn is_no_timeout(duration: Duration) -> bool {
        duration.is_zero() || duration > Duration::from_secs(86400 * 365)
    }
}

/// Builder for [`KsqlLinkTimeouts`].
#[derive(Debug, Clone)]
pub struct KsqlLinkTimeoutsBuilder {
    timeouts: KsqlLinkTimeouts,
}

impl KsqlLinkTimeoutsBuilder {
    fn new() -> Self {
        Self {
            timeouts: KsqlLinkTimeouts::default(),
        }
    }

    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connection_timeout = timeout;
        self
    }

    pub fn connection_timeout_secs(self, secs: u64) -> Self {
        self.connection_timeout(Duration::from_secs(secs))
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.request_timeout = timeout;
        self
    }

    pub fn request_timeout_secs(self, secs: u64) -> Self {
        self.request_timeout(Duration::from_secs(secs))
    }

    /// Set to 0 to disable.
    pub fn push_idle_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.push_idle_timeout = timeout;
        self
    }

    pub fn push_idle_timeout_secs(self, secs: u64) -> Self {
        self.push_idle_timeout(Duration::from_secs(secs))
    }

    pub fn build(self) -> KsqlLinkTimeouts {
        self.timeouts
    }
}
