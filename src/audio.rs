//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed.
//! Every call is best-effort: a missing or suspended AudioContext never
//! affects gameplay.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Bug squashed; fast bugs pop at a higher pitch
    Squash { fast: bool },
    /// New bug entering from the bottom
    Spawn,
    /// Target score reached
    Victory,
    /// Miss limit reached
    Defeat,
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Suspend audio context (tab hidden)
    pub fn suspend(&self) {
        if let Some(ctx) = &self.ctx {
            if ctx.state() == web_sys::AudioContextState::Running {
                let _ = ctx.suspend();
            }
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Squash { fast } => self.play_squash(ctx, vol, fast),
            SoundEffect::Spawn => self.play_spawn(ctx, vol),
            SoundEffect::Victory => self.play_victory(ctx, vol),
            SoundEffect::Defeat => self.play_defeat(ctx, vol),
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// One enveloped blip: quick attack, exponential decay, optional
    /// frequency slide over the note's length
    #[allow(clippy::too_many_arguments)]
    fn blip(
        &self,
        ctx: &AudioContext,
        delay: f64,
        freq: f32,
        osc_type: OscillatorType,
        length: f64,
        volume: f32,
        slide: f32,
    ) {
        let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) else {
            return;
        };
        let t = ctx.current_time() + delay;

        gain.gain().set_value_at_time(0.0001, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(volume, t + 0.01)
            .ok();
        if slide != 0.0 {
            osc.frequency().set_value_at_time(freq, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time((freq + slide).max(40.0), t + length)
                .ok();
        }
        gain.gain()
            .exponential_ramp_to_value_at_time(0.0001, t + length)
            .ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + length + 0.02).ok();
    }

    /// Squash - short downward square pop, higher pitched for fast bugs
    fn play_squash(&self, ctx: &AudioContext, vol: f32, fast: bool) {
        let freq = if fast { 900.0 } else { 600.0 };
        self.blip(ctx, 0.0, freq, OscillatorType::Square, 0.05, vol * 0.25, -200.0);
    }

    /// Spawn - soft rising whoosh
    fn play_spawn(&self, ctx: &AudioContext, vol: f32) {
        self.blip(ctx, 0.0, 220.0, OscillatorType::Sine, 0.07, vol * 0.12, 120.0);
    }

    /// Victory - two ascending triangle notes
    fn play_victory(&self, ctx: &AudioContext, vol: f32) {
        self.blip(ctx, 0.0, 600.0, OscillatorType::Triangle, 0.12, vol * 0.25, 120.0);
        self.blip(ctx, 0.12, 900.0, OscillatorType::Triangle, 0.12, vol * 0.22, 100.0);
    }

    /// Defeat - two descending sawtooth slides
    fn play_defeat(&self, ctx: &AudioContext, vol: f32) {
        self.blip(ctx, 0.0, 300.0, OscillatorType::Sawtooth, 0.12, vol * 0.25, -140.0);
        self.blip(ctx, 0.12, 180.0, OscillatorType::Sawtooth, 0.15, vol * 0.22, -120.0);
    }
}
