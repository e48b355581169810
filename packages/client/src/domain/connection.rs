//! Connection lifecycle state machine for the realtime chat session.
//!
//! The machine is pure: it receives lifecycle events and answers with the
//! effect the driver must perform (dial now, dial after a delay, announce
//! room membership, stop retrying). The driver in `chat::runner` owns the
//! actual socket and timers, so backoff and retry-cap behavior is testable
//! without either.

use std::time::Duration;

/// Connection status as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Reconnection policy: exponential backoff with a delay cap and an
/// attempt cap.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before reconnection attempt `attempt` (0-based):
    /// `base_delay * 2^attempt`, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Lifecycle events fed into the machine by the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The driver wants to open the transport (initial connect or a
    /// scheduled reconnect firing)
    ConnectRequested,
    /// Transport opened successfully
    Opened,
    /// The remote side dropped the connection
    RemoteClosed { server_initiated: bool },
    /// Transport-level failure (dial or mid-session)
    TransportFailed { reason: String },
    /// The local side closed intentionally
    LocallyClosed,
    /// User pressed the retry affordance while in the error state
    RetryRequested,
}

/// What the driver must do after applying an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEffect {
    None,
    /// Open the transport now
    Connect,
    /// Announce membership in all known rooms, then join the active room
    AnnounceRooms,
    /// Open the transport again after the given delay
    Reconnect { delay: Duration },
    /// Retry budget exhausted; stay in the error state until a manual retry
    GiveUp,
}

/// Pure connection state machine.
///
/// States: disconnected → connecting → connected; connected → disconnected
/// (remote or local close); connecting|connected → error (transport
/// failure); error → connecting (scheduled or manual retry) or terminal
/// after the attempt cap.
#[derive(Debug, Clone)]
pub struct ConnectionStateMachine {
    status: ConnectionStatus,
    attempts: u32,
    last_error: Option<String>,
    policy: ReconnectPolicy,
}

impl ConnectionStateMachine {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            attempts: 0,
            last_error: None,
            policy,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.policy.max_attempts
    }

    /// Last transport failure message, kept for the status banner
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Apply a lifecycle event and return the effect the driver must run
    pub fn apply(&mut self, event: ConnectionEvent) -> ConnectionEffect {
        match event {
            ConnectionEvent::ConnectRequested => match self.status {
                ConnectionStatus::Disconnected | ConnectionStatus::Error => {
                    self.status = ConnectionStatus::Connecting;
                    ConnectionEffect::Connect
                }
                // Already connecting or connected: nothing to do
                _ => ConnectionEffect::None,
            },
            ConnectionEvent::Opened => {
                self.status = ConnectionStatus::Connected;
                self.attempts = 0;
                self.last_error = None;
                ConnectionEffect::AnnounceRooms
            }
            ConnectionEvent::RemoteClosed { server_initiated } => {
                self.status = ConnectionStatus::Disconnected;
                if server_initiated {
                    // Server kicked us: reconnect immediately
                    ConnectionEffect::Reconnect {
                        delay: Duration::ZERO,
                    }
                } else {
                    ConnectionEffect::None
                }
            }
            ConnectionEvent::TransportFailed { reason } => {
                self.status = ConnectionStatus::Error;
                self.last_error = Some(reason);
                if self.attempts >= self.policy.max_attempts {
                    ConnectionEffect::GiveUp
                } else {
                    let delay = self.policy.delay_for(self.attempts);
                    self.attempts += 1;
                    ConnectionEffect::Reconnect { delay }
                }
            }
            ConnectionEvent::LocallyClosed => {
                self.status = ConnectionStatus::Disconnected;
                ConnectionEffect::None
            }
            ConnectionEvent::RetryRequested => match self.status {
                ConnectionStatus::Error => {
                    self.status = ConnectionStatus::Connecting;
                    // A manual retry restarts the backoff budget
                    self.attempts = 0;
                    ConnectionEffect::Connect
                }
                _ => ConnectionEffect::None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> ConnectionStateMachine {
        ConnectionStateMachine::new(ReconnectPolicy::default())
    }

    fn fail(machine: &mut ConnectionStateMachine) -> ConnectionEffect {
        machine.apply(ConnectionEvent::TransportFailed {
            reason: "connection reset".to_string(),
        })
    }

    #[test]
    fn test_successful_open_resets_attempts() {
        // テスト項目: 接続成功で再接続カウンタが 0 に戻り、ルーム再参加が指示される
        // given (前提条件):
        let mut machine = machine();
        machine.apply(ConnectionEvent::ConnectRequested);
        fail(&mut machine);
        assert_eq!(machine.attempts(), 1);

        // when (操作):
        machine.apply(ConnectionEvent::ConnectRequested);
        let effect = machine.apply(ConnectionEvent::Opened);

        // then (期待する結果):
        assert_eq!(effect, ConnectionEffect::AnnounceRooms);
        assert_eq!(machine.status(), ConnectionStatus::Connected);
        assert_eq!(machine.attempts(), 0);
        assert_eq!(machine.last_error(), None);
    }

    #[test]
    fn test_five_errors_schedule_five_increasing_delays_then_give_up() {
        // テスト項目: 連続する transport エラーで 5 回だけ再接続が予約され、
        //            遅延は単調増加し、6 回目は GiveUp になる
        // given (前提条件):
        let mut machine = machine();
        machine.apply(ConnectionEvent::ConnectRequested);

        // when (操作):
        let mut delays = Vec::new();
        for _ in 0..5 {
            match fail(&mut machine) {
                ConnectionEffect::Reconnect { delay } => delays.push(delay),
                other => panic!("expected Reconnect, got {:?}", other),
            }
            machine.apply(ConnectionEvent::ConnectRequested);
        }
        let sixth = fail(&mut machine);

        // then (期待する結果):
        assert_eq!(delays.len(), 5);
        for pair in delays.windows(2) {
            assert!(pair[0] < pair[1], "delays must strictly increase: {:?}", delays);
        }
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
                Duration::from_secs(16),
            ]
        );
        assert_eq!(sixth, ConnectionEffect::GiveUp);
        assert_eq!(machine.status(), ConnectionStatus::Error);
    }

    #[test]
    fn test_delay_is_capped_at_max_delay() {
        // テスト項目: バックオフ遅延が max_delay で頭打ちになる
        // given (前提条件):
        let policy = ReconnectPolicy {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            max_attempts: 5,
        };

        // when (操作):
        let delays: Vec<_> = (0..5).map(|n| policy.delay_for(n)).collect();

        // then (期待する結果):
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(5),
                Duration::from_secs(5),
            ]
        );
    }

    fn machine_in_terminal_error() -> ConnectionStateMachine {
        let mut machine = machine();
        machine.apply(ConnectionEvent::ConnectRequested);
        for _ in 0..5 {
            fail(&mut machine);
            machine.apply(ConnectionEvent::ConnectRequested);
        }
        let effect = fail(&mut machine);
        assert_eq!(effect, ConnectionEffect::GiveUp);
        machine
    }

    #[test]
    fn test_manual_retry_reenters_connecting_after_give_up() {
        // テスト項目: GiveUp 後の手動リトライで connecting に戻る
        // given (前提条件):
        let mut machine = machine_in_terminal_error();
        assert_eq!(machine.status(), ConnectionStatus::Error);

        // when (操作):
        let effect = machine.apply(ConnectionEvent::RetryRequested);

        // then (期待する結果):
        assert_eq!(effect, ConnectionEffect::Connect);
        assert_eq!(machine.status(), ConnectionStatus::Connecting);
        assert_eq!(machine.attempts(), 0);
    }

    #[test]
    fn test_server_initiated_close_reconnects_immediately() {
        // テスト項目: サーバー起因の切断では即時再接続が予約される
        // given (前提条件):
        let mut machine = machine();
        machine.apply(ConnectionEvent::ConnectRequested);
        machine.apply(ConnectionEvent::Opened);

        // when (操作):
        let effect = machine.apply(ConnectionEvent::RemoteClosed {
            server_initiated: true,
        });

        // then (期待する結果):
        assert_eq!(
            effect,
            ConnectionEffect::Reconnect {
                delay: Duration::ZERO
            }
        );
        assert_eq!(machine.status(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_local_close_does_not_reconnect() {
        // テスト項目: ローカル起因の切断では再接続が予約されない
        // given (前提条件):
        let mut machine = machine();
        machine.apply(ConnectionEvent::ConnectRequested);
        machine.apply(ConnectionEvent::Opened);

        // when (操作):
        let effect = machine.apply(ConnectionEvent::LocallyClosed);

        // then (期待する結果):
        assert_eq!(effect, ConnectionEffect::None);
        assert_eq!(machine.status(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_last_error_is_surfaced() {
        // テスト項目: 最後の transport エラーのメッセージが保持される
        // given (前提条件):
        let mut machine = machine();
        machine.apply(ConnectionEvent::ConnectRequested);

        // when (操作):
        machine.apply(ConnectionEvent::TransportFailed {
            reason: "tls handshake failed".to_string(),
        });

        // then (期待する結果):
        assert_eq!(machine.last_error(), Some("tls handshake failed"));
        assert_eq!(machine.status(), ConnectionStatus::Error);
    }

}
