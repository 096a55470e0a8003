//! Synthesized two-tone chime
//!
//! Two sine tones (880 Hz, then 659.25 Hz 180 ms later), each with a short
//! linear attack and an exponential decay, rendered once into a 16-bit mono
//! WAV file that the player command can replay on every alarm repetition.

use std::{
    f64::consts::PI,
    fs, io,
    path::{Path, PathBuf},
};

pub const SAMPLE_RATE: u32 = 22_050;
pub const TONES_HZ: [f64; 2] = [880.0, 659.25];
pub const CHIME_FILE: &str = "chime.wav";

const TONE_SPACING: f64 = 0.18;
const ATTACK: f64 = 0.02;
const DECAY_END: f64 = 0.45;
const TONE_LENGTH: f64 = 0.5;
const PEAK_GAIN: f64 = 0.35;
const FLOOR_GAIN: f64 = 0.001;

/// Gain of a single tone `t` seconds after it starts
fn envelope(t: f64) -> f64 {
    if !(0.0..TONE_LENGTH).contains(&t) {
        0.0
    } else if t < ATTACK {
        PEAK_GAIN * t / ATTACK
    } else if t < DECAY_END {
        let progress = (t - ATTACK) / (DECAY_END - ATTACK);
        PEAK_GAIN * (FLOOR_GAIN / PEAK_GAIN).powf(progress)
    } else {
        FLOOR_GAIN
    }
}

/// Length of the whole chime in seconds
pub fn chime_length() -> f64 {
    TONE_SPACING * (TONES_HZ.len() - 1) as f64 + TONE_LENGTH
}

pub fn chime_samples(sample_rate: u32) -> Vec<f32> {
    let count = (chime_length() * f64::from(sample_rate)).ceil() as usize;
    (0..count)
        .map(|n| {
            let t = n as f64 / f64::from(sample_rate);
            TONES_HZ
                .iter()
                .enumerate()
                .map(|(i, freq)| {
                    let local = t - i as f64 * TONE_SPACING;
                    envelope(local) * (2.0 * PI * freq * local).sin()
                })
                .sum::<f64>() as f32
        })
        .collect()
}

/// Encode mono samples in [-1, 1] as a 16-bit PCM WAV file
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let mut out = Vec::with_capacity(44 + data_len as usize);

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // mono
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

/// Render the chime into `dir` and return its path
pub fn write_chime(dir: &Path) -> io::Result<PathBuf> {
    let path = dir.join(CHIME_FILE);
    fs::write(&path, encode_wav(&chime_samples(SAMPLE_RATE), SAMPLE_RATE))?;
    Ok(path)
}
