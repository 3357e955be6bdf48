use yule_core::{AudioOutput, MediaError};

/// Headless audio output: records what would be playing and logs it
#[derive(Debug, Default)]
pub struct LogAudio {
    now_playing: Option<String>,
}

impl LogAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_playing(&self) -> Option<&str> {
        self.now_playing.as_deref()
    }
}

impl AudioOutput for LogAudio {
    fn play(&mut self, track: &str) -> Result<(), MediaError> {
        if track.trim().is_empty() {
            return Err(MediaError::PlaybackRejected("empty track path".into()));
        }
        log::info!("Playing {}", track);
        self.now_playing = Some(track.to_string());
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(track) = self.now_playing.take() {
            log::info!("Paused {}", track);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yule_core::MusicPlayer;

    #[test]
    fn test_player_drives_output() {
        let mut player = MusicPlayer::new(LogAudio::new());
        assert!(player.load("jingle.ogg"));
        assert_eq!(player.output().now_playing(), Some("jingle.ogg"));
        assert!(!player.toggle());
        assert_eq!(player.output().now_playing(), None);
    }

    #[test]
    fn test_blank_track_is_rejected() {
        let mut player = MusicPlayer::new(LogAudio::new());
        assert!(!player.load("  "));
        assert!(!player.is_playing());
    }
}
