/// Sound handles the simulation can cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    Fireball,
    Roll,
    Footstep,
}

/// Fire-and-forget audio output. Implementations must not block the tick.
pub trait AudioSink {
    fn play(&mut self, sound: Sound);
}

/// Sink that only logs cues. The headless runner and the windowed build both
/// use it; the simulation never depends on a sound having played.
#[derive(Debug, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, sound: Sound) {
        log::trace!("sound cue: {:?}", sound);
    }
}

/// Sink that records every cue in order. Used by tests.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub played: Vec<Sound>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, sound: Sound) {
        self.played.push(sound);
    }
}
