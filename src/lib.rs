//! Compositore live di livelli video per anteprime camera + schermo.
//! Fornisce:
//! - Modello a livelli (sorgente camera o regione dello schermo) con ordine Z e selezione
//! - Composizione per tick di tutti i livelli in un'unica tela RGB
//! - Macchina a stati per trascinamento, ridimensionamento a 8 maniglie, zoom e spostamento da tastiera
//! - Sessione che collega le sorgenti di acquisizione esterne al ciclo di composizione
//! - Anteprima nel terminale per provare il tutto senza interfaccia grafica

use std::time::{Duration, Instant};

pub mod compositor;
pub mod config;
pub mod input;
pub mod interaction;
pub mod layer;
pub mod renderer;
pub mod resample;
pub mod session;
pub mod source;
pub mod store;
pub mod windows;

pub use compositor::{Canvas, Compositor};
pub use interaction::{CursorShape, Gesture, InteractionController, NudgeKey, ResizeHandle};
pub use layer::{Layer, LayerId, NewLayer, ScreenRect, SourceDescriptor, SourceKind};
pub use session::{Session, SessionError};
pub use source::{CameraSource, RegionSelection, RegionSelector, ScreenSource, SourceError};
pub use store::{LayerStore, StoreError};

/// Area rettangolare in coordinate della tela (origine con segno)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Bordo destro esclusivo
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Bordo inferiore esclusivo
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Contenimento con bordi inclusi, usato dal puntatore
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        let (x, y) = (x as i64, y as i64);
        x >= self.x as i64 && x <= self.right() && y >= self.y as i64 && y <= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !self.intersection(other).is_empty()
    }

    /// Intersezione di due aree; vuota se non si sovrappongono
    pub fn intersection(&self, other: &Rect) -> Rect {
        let left = (self.x as i64).max(other.x as i64);
        let top = (self.y as i64).max(other.y as i64);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return Rect::new(self.x, self.y, 0, 0);
        }
        Rect::new(left as i32, top as i32, (right - left) as u32, (bottom - top) as u32)
    }
}

/// Cadenza fissa del ciclo di acquisizione e composizione
pub struct TickTimer {
    period: Duration,
    last_tick: Instant,
    tick_count: u64,
}

impl TickTimer {
    pub fn new(period: Duration) -> Self {
        // Almeno 1 ms per evitare un ciclo a vuoto
        let period = period.max(Duration::from_millis(1));
        Self {
            period,
            last_tick: Instant::now(),
            tick_count: 0,
        }
    }

    /// Tempo mancante al prossimo tick
    pub fn time_until_next_tick(&self) -> Duration {
        self.period.saturating_sub(self.last_tick.elapsed())
    }

    pub fn is_due(&self) -> bool {
        self.last_tick.elapsed() >= self.period
    }

    pub fn mark_tick(&mut self) {
        self.last_tick = Instant::now();
        self.tick_count += 1;
    }

    pub fn get_period(&self) -> Duration {
        self.period
    }

    pub fn get_tick_count(&self) -> u64 {
        self.tick_count
    }
}
