//! Per-connection session handling.
//!
//! A connection is driven through a small pipeline, each stage testable on its
//! own with synthetic bytes:
//! - [`line`]: bounded assembly of received bytes into records.
//! - [`dispatch`]: type marker check, decoding and forwarding to the [`Arm`].
//! - [`Session`]: owns the line buffer and the idle clock of one client.
//!
//! [`serve`] runs a session over any [`embedded_io_async::Read`] stream until the
//! peer goes away or stays silent for longer than the idle timeout.
pub mod dispatch;
pub mod line;

use crate::config::{SessionConfig, LINE_CAPACITY, READ_CHUNK_SIZE};
use crate::robot::arm::Arm;
use dispatch::{dispatch, Dispatch};
use embassy_time::{with_deadline, Duration, Instant, TimeoutError};
use embedded_hal::pwm::SetDutyCycle;
use embedded_io_async::Read;
use line::{Feed, LineAssembler};
use log::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    /// No byte arrived within the idle timeout.
    TimedOut,
    /// The peer closed the connection or the link failed.
    Closed,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub applied: u32,
    pub ignored: u32,
    pub decode_misses: u32,
    pub overflows: u32,
    /// Servo commands that decoded but whose every channel write failed.
    pub write_failures: u32,
}

#[derive(Debug)]
pub struct Session {
    line: LineAssembler<LINE_CAPACITY>,
    last_activity: Instant,
    idle_timeout: Duration,
    state: SessionState,
    stats: SessionStats,
}

impl Session {
    pub fn new(now: Instant, config: &SessionConfig) -> Self {
        Self {
            line: LineAssembler::new(),
            last_activity: now,
            idle_timeout: config.idle_timeout,
            state: SessionState::Active,
            stats: SessionStats::default(),
        }
    }

    /// Feeds received bytes through the line assembler, dispatching every
    /// complete record to `arm`.
    ///
    /// Bytes arriving after the session ended are discarded.
    pub fn ingest<PWM: SetDutyCycle>(
        &mut self,
        bytes: &[u8],
        now: Instant,
        arm: &mut Arm<PWM>,
    ) -> SessionState {
        if self.state != SessionState::Active {
            return self.state;
        }

        for &byte in bytes {
            self.last_activity = now;
            match self.line.feed(byte) {
                Feed::Pending => {}
                Feed::Record(record) => {
                    let counter = match dispatch(record, arm) {
                        Dispatch::Applied(0) => {
                            warn!("Servo command decoded but no channel was written");
                            &mut self.stats.write_failures
                        }
                        Dispatch::Applied(_) => &mut self.stats.applied,
                        Dispatch::Ignored => &mut self.stats.ignored,
                        Dispatch::DecodeMiss => &mut self.stats.decode_misses,
                    };
                    *counter = counter.saturating_add(1);
                }
                Feed::Overflow => {
                    warn!("Buffer overflow: record longer than {LINE_CAPACITY} characters discarded");
                    self.stats.overflows = self.stats.overflows.saturating_add(1);
                }
            }
        }
        self.state
    }

    /// Times the session out once more than the idle timeout has elapsed since the
    /// last received byte.
    pub fn poll(&mut self, now: Instant) -> SessionState {
        if self.state == SessionState::Active {
            let idle = now
                .checked_duration_since(self.last_activity)
                .unwrap_or(Duration::from_ticks(0));
            if idle > self.idle_timeout {
                info!("Connection timeout after {} ms idle", idle.as_millis());
                self.state = SessionState::TimedOut;
            }
        }
        self.state
    }

    pub fn close(&mut self) {
        if self.state == SessionState::Active {
            self.state = SessionState::Closed;
        }
    }

    /// Earliest instant at which [`Session::poll`] times the session out.
    pub fn deadline(&self) -> Instant {
        self.last_activity + self.idle_timeout + Duration::from_ticks(1)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Characters buffered towards the next record.
    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        self.line.len()
    }
}

/// Runs one session over `reader` until it times out or closes.
pub async fn serve<R, PWM>(reader: &mut R, arm: &mut Arm<PWM>, config: &SessionConfig) -> Session
where
    R: Read,
    PWM: SetDutyCycle,
{
    let mut session = Session::new(Instant::now(), config);
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    while session.state() == SessionState::Active {
        match with_deadline(session.deadline(), reader.read(&mut chunk)).await {
            Err(TimeoutError) => {
                session.poll(Instant::now());
            }
            Ok(Ok(0)) => {
                info!("Client closed the connection");
                session.close();
            }
            Ok(Ok(n)) => {
                session.ingest(&chunk[..n], Instant::now(), arm);
            }
            Ok(Err(e)) => {
                error!("Read error: {:?}", e);
                session.close();
            }
        }
    }
    session
}
