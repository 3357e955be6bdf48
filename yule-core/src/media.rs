//! User media the scene reads: the photo queue and the music track.

use core::fmt;

use heapless::HistoryBuffer;
use thiserror::Error;

/// Photos kept at once; older uploads fall off the front
pub const MAX_PHOTOS: usize = 200;

/// Bounded, insertion-ordered photo references. Photo entity `i` is the
/// `i`-th oldest retained reference
pub struct PhotoQueue {
    photos: HistoryBuffer<String, MAX_PHOTOS>,
}

impl PhotoQueue {
    pub fn new() -> Self {
        Self {
            photos: HistoryBuffer::new(),
        }
    }

    /// Append a batch in order, keeping only the most recent [`MAX_PHOTOS`].
    /// Returns how many older references were dropped
    pub fn upload<I, S>(&mut self, batch: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut evicted = 0;
        for photo in batch {
            if self.photos.len() == MAX_PHOTOS {
                evicted += 1;
            }
            self.photos.write(photo.into());
        }

        if evicted > 0 {
            log::debug!("photo queue full, dropped {} oldest", evicted);
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.len() == 0
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.photos.oldest_ordered().map(String::as_str)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.iter().nth(index)
    }

    pub fn clear(&mut self) {
        self.photos.clear();
    }
}

impl Default for PhotoQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PhotoQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum MediaError {
    #[error("no track loaded")]
    NoTrack,
    #[error("playback rejected: {0}")]
    PlaybackRejected(String),
}

/// Whatever actually plays the audio
pub trait AudioOutput {
    fn play(&mut self, track: &str) -> Result<(), MediaError>;
    fn pause(&mut self);
}

/// Single-track player with play/pause state
pub struct MusicPlayer<A: AudioOutput> {
    output: A,
    track: Option<String>,
    playing: bool,
}

impl<A: AudioOutput> MusicPlayer<A> {
    pub fn new(output: A) -> Self {
        Self {
            output,
            track: None,
            playing: false,
        }
    }

    /// Replace the current track and start it
    pub fn load(&mut self, track: impl Into<String>) -> bool {
        if self.playing {
            self.output.pause();
            self.playing = false;
        }
        self.track = Some(track.into());
        self.start()
    }

    /// Flip between playing and paused. Returns the new playing state
    pub fn toggle(&mut self) -> bool {
        if self.playing {
            self.output.pause();
            self.playing = false;
            false
        } else {
            self.start()
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn track(&self) -> Option<&str> {
        self.track.as_deref()
    }

    pub fn output(&self) -> &A {
        &self.output
    }

    fn start(&mut self) -> bool {
        let result = match self.track.as_deref() {
            Some(track) => self.output.play(track),
            None => Err(MediaError::NoTrack),
        };

        match result {
            Ok(()) => self.playing = true,
            Err(e) => {
                log::warn!("playback interrupted or failed: {}", e);
                self.playing = false;
            }
        }
        self.playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeOutput {
        reject: bool,
        plays: Vec<String>,
        pauses: usize,
    }

    impl AudioOutput for FakeOutput {
        fn play(&mut self, track: &str) -> Result<(), MediaError> {
            if self.reject {
                return Err(MediaError::PlaybackRejected("autoplay blocked".into()));
            }
            self.plays.push(track.to_string());
            Ok(())
        }

        fn pause(&mut self) {
            self.pauses += 1;
        }
    }

    #[test]
    fn test_upload_keeps_order() {
        let mut queue = PhotoQueue::new();
        queue.upload(["a", "b"]);
        queue.upload(["c"]);
        let photos: Vec<&str> = queue.iter().collect();
        assert_eq!(photos, vec!["a", "b", "c"]);
        assert_eq!(queue.get(1), Some("b"));
    }

    #[test]
    fn test_upload_over_capacity_keeps_most_recent() {
        let mut queue = PhotoQueue::new();
        let batch: Vec<String> = (0..210).map(|i| format!("photo-{i}")).collect();
        let evicted = queue.upload(batch);

        assert_eq!(evicted, 10);
        assert_eq!(queue.len(), MAX_PHOTOS);
        let photos: Vec<&str> = queue.iter().collect();
        assert_eq!(photos.first(), Some(&"photo-10"));
        assert_eq!(photos.last(), Some(&"photo-209"));
        for pair in photos.windows(2) {
            let a: usize = pair[0].trim_start_matches("photo-").parse().unwrap();
            let b: usize = pair[1].trim_start_matches("photo-").parse().unwrap();
            assert_eq!(b, a + 1);
        }
    }

    #[test]
    fn test_empty_queue() {
        let queue = PhotoQueue::default();
        assert!(queue.is_empty());
        assert_eq!(queue.get(0), None);
    }

    #[test]
    fn test_load_starts_playback() {
        let mut player = MusicPlayer::new(FakeOutput::default());
        assert!(!player.is_playing());
        assert!(player.load("carols.mp3"));
        assert!(player.is_playing());
        assert_eq!(player.track(), Some("carols.mp3"));
        assert_eq!(player.output().plays, vec!["carols.mp3".to_string()]);
    }

    #[test]
    fn test_toggle() {
        let mut player = MusicPlayer::new(FakeOutput::default());
        player.load("carols.mp3");
        assert!(!player.toggle());
        assert_eq!(player.output().pauses, 1);
        assert!(player.toggle());
        assert_eq!(player.output().plays.len(), 2);
    }

    #[test]
    fn test_toggle_without_track_stays_paused() {
        let mut player = MusicPlayer::new(FakeOutput::default());
        assert!(!player.toggle());
        assert!(!player.is_playing());
    }

    #[test]
    fn test_rejected_playback_stays_paused() {
        let mut player = MusicPlayer::new(FakeOutput {
            reject: true,
            ..FakeOutput::default()
        });
        assert!(!player.load("carols.mp3"));
        assert!(!player.is_playing());
        assert_eq!(player.track(), Some("carols.mp3"));
    }
}
