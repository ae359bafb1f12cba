//! Computer-keyboard piano: key to pitch, and which held key sounds.
//!
//! The home row plays the white keys and the row above plays the black keys,
//! from C up to the D of the next octave:
//!
//! ```text
//!   w e   t y u   o
//!  a s d f g h j k l
//! ```

/// Key and its semitone above C.
const KEY_MAP: [(char, i32); 15] = [
    ('a', 0),
    ('w', 1),
    ('s', 2),
    ('e', 3),
    ('d', 4),
    ('f', 5),
    ('t', 6),
    ('g', 7),
    ('y', 8),
    ('h', 9),
    ('u', 10),
    ('j', 11),
    ('k', 12),
    ('o', 13),
    ('l', 14),
];

const A4_HZ: f32 = 440.0;
const MIN_OCTAVE: i32 = 0;
const MAX_OCTAVE: i32 = 8;

pub fn is_note_key(key: char) -> bool {
    semitone(key).is_some()
}

fn semitone(key: char) -> Option<i32> {
    KEY_MAP
        .iter()
        .find(|(k, _)| *k == key)
        .map(|&(_, semitone)| semitone)
}

/// Equal-tempered frequency of `key` with `octave` as the C octave (4 = middle C).
pub fn note_frequency(key: char, octave: i32) -> Option<f32> {
    let offset = (octave - 4) * 12 + semitone(key)? - 9;
    Some(A4_HZ * 2.0_f32.powf(offset as f32 / 12.0))
}

/// What the voice should be told after a key event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteEvent {
    /// New key down: retune and open the gate.
    On(f32),
    /// A held key was let go but others remain: retune only.
    Retune(f32),
    /// Nothing held any more.
    Off,
}

/// Tracks held keys in press order. The oldest held key is the reference
/// pitch once the most recent one is released.
pub struct Keyboard {
    octave: i32,
    held: Vec<char>,
}

impl Keyboard {
    pub fn new(octave: i32) -> Self {
        Self {
            octave: octave.clamp(MIN_OCTAVE, MAX_OCTAVE),
            held: Vec::with_capacity(KEY_MAP.len()),
        }
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    pub fn octave_down(&mut self) {
        self.octave = (self.octave - 1).max(MIN_OCTAVE);
    }

    pub fn octave_up(&mut self) {
        self.octave = (self.octave + 1).min(MAX_OCTAVE);
    }

    pub fn held(&self) -> &[char] {
        &self.held
    }

    /// Key repeat of an already-held key is ignored.
    pub fn press(&mut self, key: char) -> Option<NoteEvent> {
        if self.held.contains(&key) {
            return None;
        }
        let hz = note_frequency(key, self.octave)?;
        self.held.push(key);
        Some(NoteEvent::On(hz))
    }

    pub fn release(&mut self, key: char) -> Option<NoteEvent> {
        let index = self.held.iter().position(|&k| k == key)?;
        self.held.remove(index);

        match self.held.first() {
            Some(&reference) => note_frequency(reference, self.octave).map(NoteEvent::Retune),
            None => Some(NoteEvent::Off),
        }
    }

    pub fn release_all(&mut self) -> NoteEvent {
        self.held.clear();
        NoteEvent::Off
    }
}
