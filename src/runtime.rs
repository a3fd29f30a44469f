use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// Unified event type consumed by the frame loop
#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Where key and resize events come from.
pub trait GameEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// `Err(Timeout)` when nothing arrived in time.
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;
}

/// Reads crossterm events on a background thread.
pub struct CrosstermEventSource {
    rx: Receiver<GameEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || loop {
            let event = match event::read() {
                // Windows reports releases too; only presses and repeats type.
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => GameEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => GameEvent::Resize,
                Ok(_) => continue,
                Err(_) => break,
            };
            if tx.send(event).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Frame cadence.
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// One frame every `interval`.
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Channel-fed event source for tests and headless runs
pub struct ChannelEventSource {
    rx: Receiver<GameEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }
}

impl GameEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Frame pump: hands out input events as they arrive and a `Tick` every
/// time the frame deadline passes, however busy the input is.
pub struct Runner<E: GameEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_tick: Instant,
}

impl<E: GameEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let next_tick = Instant::now() + ticker.interval();
        Self {
            event_source,
            ticker,
            next_tick,
        }
    }

    fn tick(&mut self) -> GameEvent {
        self.next_tick = Instant::now() + self.ticker.interval();
        GameEvent::Tick
    }

    /// Blocks until the next event or the frame deadline, whichever is first
    pub fn step(&mut self) -> GameEvent {
        let now = Instant::now();
        if now >= self.next_tick {
            return self.tick();
        }

        match self.event_source.recv_timeout(self.next_tick - now) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => self.tick(),
            Err(RecvTimeoutError::Disconnected) => {
                thread::sleep(self.next_tick.saturating_duration_since(Instant::now()));
                self.tick()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::sync::mpsc;

    fn key(c: char) -> GameEvent {
        GameEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = ChannelEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let mut runner = Runner::new(es, ticker);

        // With no events available, step should yield Tick
        let ev = runner.step();
        match ev {
            GameEvent::Tick => {}
            _ => panic!("expected Tick on timeout"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(GameEvent::Resize).unwrap();
        let es = ChannelEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(200));
        let mut runner = Runner::new(es, ticker);

        match runner.step() {
            GameEvent::Resize => {}
            _ => panic!("expected Resize event"),
        }
    }

    #[test]
    fn busy_input_does_not_starve_ticks() {
        let (tx, rx) = mpsc::channel();
        for _ in 0..1000 {
            tx.send(key('a')).unwrap();
        }
        let mut runner = Runner::new(ChannelEventSource::new(rx), FixedTicker::new(Duration::from_millis(5)));
        thread::sleep(Duration::from_millis(10));

        assert!(matches!(runner.step(), GameEvent::Tick));
        assert!(matches!(runner.step(), GameEvent::Key(_)));
    }

    #[test]
    fn disconnected_source_still_ticks() {
        let (tx, rx) = mpsc::channel::<GameEvent>();
        drop(tx);
        let mut runner = Runner::new(ChannelEventSource::new(rx), FixedTicker::new(Duration::from_millis(2)));

        let started = Instant::now();
        assert!(matches!(runner.step(), GameEvent::Tick));
        assert!(matches!(runner.step(), GameEvent::Tick));
        assert!(started.elapsed() >= Duration::from_millis(2));
    }
}
