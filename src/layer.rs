//! Which layer of the keymap is being looked at, and which one to go back to after a peek.

/// Index of the layer the firmware starts on
pub const DEFAULT_LAYER: u8 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayerError {
    /// The keymap has no layer at `target`
    OutOfRange { target: u8, layer_count: usize },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerState {
    active: u8,
    /// Only meaningful right after a peek
    previous: u8,
}

impl LayerState {
    pub const fn new() -> Self {
        LayerState {
            active: DEFAULT_LAYER,
            previous: DEFAULT_LAYER,
        }
    }

    pub const fn active(&self) -> u8 {
        self.active
    }

    pub const fn previous(&self) -> u8 {
        self.previous
    }

    pub const fn is_default(&self) -> bool {
        self.active == DEFAULT_LAYER
    }

    /// Make `target` the active layer, remembering the current one for [LayerState::restore].
    /// A target the keymap doesn't have leaves the state untouched.
    pub fn change(&mut self, target: u8, layer_count: usize) -> Result<(), LayerError> {
        if target as usize >= layer_count {
            return Err(LayerError::OutOfRange { target, layer_count });
        }
        self.previous = self.active;
        self.active = target;
        Ok(())
    }

    /// Go back to the layer that was active before the last [LayerState::change]
    pub fn restore(&mut self) {
        self.active = self.previous;
    }
}
