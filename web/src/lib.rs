use mineclear_core as game;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::prelude::*;

pub use storage::*;

mod storage;

type BrowserSession = game::Session<LocalStorageRecordStore, game::SystemClock, SmallRng>;

#[wasm_bindgen(start)]
pub fn run_app() {
    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }
}

fn init_logging(level: log::LevelFilter) {
    let Some(level) = level.to_level() else {
        return;
    };
    // a second session on the same page keeps the first logger
    if console_log::init_with_level(level).is_ok() {
        log::debug!("Logging at {}", level);
    }
}

/// Helper function to use JavaScript's Math.random
fn js_random_seed() -> u64 {
    use js_sys::Math::random;
    u64::from_be_bytes([
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
    ])
}

/// Builds the core pointer event from the fields of a DOM `PointerEvent`.
fn pointer_event(
    down: bool,
    touch: bool,
    row: Option<u8>,
    column: Option<u8>,
    buttons: u16,
) -> game::PointerEvent {
    let pos = row.zip(column).map(game::CellPos::from);
    let kind = if touch {
        game::PointerKind::Touch
    } else {
        game::PointerKind::Mouse
    };
    let buttons = game::MouseButtons::from_bits_truncate(buttons);
    if down {
        game::PointerEvent::Down { pos, kind, buttons }
    } else {
        game::PointerEvent::Up { pos, kind, buttons }
    }
}

/// The game core as seen from the page script. Results cross the boundary as JSON text.
#[wasm_bindgen]
pub struct WebSession {
    session: BrowserSession,
    gestures: game::GestureResolver,
}

#[wasm_bindgen]
impl WebSession {
    /// `config_toml` may override any [`game::SessionConfig`] field.
    #[wasm_bindgen(constructor)]
    pub fn new(config_toml: Option<String>) -> Result<WebSession, JsError> {
        let config = match config_toml {
            Some(text) => game::SessionConfig::from_toml_str(&text)?,
            None => game::SessionConfig::default(),
        };
        init_logging(config.log_level);

        let seed = js_random_seed();
        log::debug!("seed: {}", seed);
        let store = LocalStorageRecordStore::new(config.records_key.clone());
        let gestures = config.gesture_resolver();
        let session = game::Session::new(
            config,
            store,
            game::SystemClock::new(),
            SmallRng::seed_from_u64(seed),
        );
        Ok(Self { session, gestures })
    }

    /// Starts a round for difficulty level 1 to 3, choosing the layout from the viewport width.
    #[wasm_bindgen(js_name = startRound)]
    pub fn start_round(&mut self, level: u8, viewport_width: u32) -> Result<String, JsError> {
        let difficulty = game::Difficulty::from_level(level)
            .ok_or_else(|| JsError::new(&format!("Unknown difficulty level {level}")))?;
        self.gestures.cancel();
        let snapshot = self.session.start_round_for_viewport(difficulty, viewport_width);
        Ok(serde_json::to_string(&snapshot)?)
    }

    #[wasm_bindgen(js_name = abandonRound)]
    pub fn abandon_round(&mut self) {
        self.gestures.cancel();
        self.session.abandon_round();
    }

    #[wasm_bindgen(js_name = playerAction)]
    pub fn player_action(&mut self, row: u8, column: u8, toggle_flag: bool) -> Result<String, JsError> {
        let pos = game::CellPos::new(row, column);
        let action = if toggle_flag {
            game::PlayerAction::toggle_flag(pos)
        } else {
            game::PlayerAction::reveal(pos)
        };
        self.apply(action)
    }

    /// Feeds a raw pointer event. Returns a report when the gesture resolved into an action.
    #[wasm_bindgen(js_name = pointerEvent)]
    pub fn pointer_event(
        &mut self,
        down: bool,
        touch: bool,
        row: Option<u8>,
        column: Option<u8>,
        buttons: u16,
    ) -> Result<Option<String>, JsError> {
        let event = pointer_event(down, touch, row, column, buttons);
        let now = game::Clock::now_ms(self.session.clock());
        self.gestures
            .handle(event, now)
            .map(|action| self.apply(action))
            .transpose()
    }

    /// Settles a waiting touch tap once its double-tap window has passed.
    pub fn poll(&mut self) -> Result<Option<String>, JsError> {
        let now = game::Clock::now_ms(self.session.clock());
        self.gestures
            .poll(now)
            .map(|action| self.apply(action))
            .transpose()
    }

    /// Milliseconds until [`Self::poll`] should run, if a tap is waiting.
    #[wasm_bindgen(js_name = pollDelayMs)]
    pub fn poll_delay_ms(&self) -> Option<u32> {
        let now = game::Clock::now_ms(self.session.clock());
        self.gestures
            .pending_deadline()
            .map(|deadline| deadline.saturating_sub(now) as u32)
    }

    pub fn tick(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.session.tick())?)
    }

    #[wasm_bindgen(js_name = tickIntervalMs)]
    pub fn tick_interval_ms(&self) -> u32 {
        self.session.config().tick_interval_ms
    }

    pub fn records(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.session.records_view())?)
    }

    #[wasm_bindgen(js_name = resetRecords)]
    pub fn reset_records(&mut self) -> Result<String, JsError> {
        self.session.reset_records()?;
        self.records()
    }

    fn apply(&mut self, action: game::PlayerAction) -> Result<String, JsError> {
        let report = self.session.player_action(action)?;
        if report.ended.is_some() {
            self.gestures.cancel();
        }
        Ok(serde_json::to_string(&report)?)
    }
}
