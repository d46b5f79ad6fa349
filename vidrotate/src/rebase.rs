/*!
    Timestamp hygiene between the filter graph and the encoder, and for
    stream-copied packets.
*/

use ffmpeg_types::{MediaDuration, Packet, Pts, Rational, VideoFrame};

/**
    Moves filtered frames into the encoder time base and keeps their pts
    strictly increasing.

    Frames without a pts get one synthesized one frame duration after the
    previous frame. A pts that would not advance is bumped to `last + 1`.
*/
#[derive(Debug)]
pub struct VideoTimestamps {
    time_base: Rational,
    frame_duration: MediaDuration,
    last: Option<i64>,
    synthesized: u64,
    bumped: u64,
}

impl VideoTimestamps {
    /**
        Rebase into `time_base`, where one frame lasts `frame_duration`.
    */
    pub fn new(time_base: Rational, frame_duration: MediaDuration) -> Self {
        Self {
            time_base,
            frame_duration: MediaDuration(frame_duration.0.max(1)),
            last: None,
            synthesized: 0,
            bumped: 0,
        }
    }

    pub fn rebase(&mut self, frame: &mut VideoFrame) {
        let pts = match frame.pts {
            Some(pts) => pts.rescale(frame.time_base, self.time_base).0,
            None => {
                self.synthesized += 1;
                self.last
                    .map_or(0, |last| last.saturating_add(self.frame_duration.0))
            }
        };
        let pts = match self.last {
            Some(last) if pts <= last => {
                self.bumped += 1;
                last.saturating_add(1)
            }
            _ => pts,
        };

        self.last = Some(pts);
        frame.pts = Some(Pts(pts));
        frame.time_base = self.time_base;
    }

    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /// Frames that arrived without a pts.
    pub fn synthesized(&self) -> u64 {
        self.synthesized
    }

    /// Frames whose pts had to be moved forward.
    pub fn bumped(&self) -> u64 {
        self.bumped
    }
}

/**
    Rejects stream-copied packets whose dts goes backwards.
*/
#[derive(Debug, Default)]
pub struct DtsGuard {
    last: Option<(Pts, Rational)>,
}

impl DtsGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Returns false if `packet` must be dropped. Packets without a dts are
        always admitted.
    */
    pub fn admit(&mut self, packet: &Packet) -> bool {
        let Some(dts) = packet.dts else {
            return true;
        };
        if let Some((last, time_base)) = self.last {
            if dts < last.rescale(time_base, packet.time_base) {
                return false;
            }
        }
        self.last = Some((dts, packet.time_base));
        true
    }
}
