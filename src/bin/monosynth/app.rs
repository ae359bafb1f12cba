//! Audio device setup and the wiring between the audio callback and the UI.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ratatui::DefaultTerminal;
use rtrb::RingBuffer;

use monosynth::{
    synth::{handle::CONTROL_QUEUE_SIZE, voice::VoiceMeter},
    voice_channel, EngineConfig,
};

use crate::{
    ui::{UiApp, VIS_BUFFER_SIZE},
    Args,
};

/// Scope ring holds this many visualization windows.
const AUDIO_RING_WINDOWS: usize = 8;
const METER_QUEUE_SIZE: usize = 64;

pub fn run(terminal: &mut DefaultTerminal, args: &Args) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let supported = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = supported.sample_rate().0 as f32;
    let channels = supported.channels() as usize;

    let config = EngineConfig::new(sample_rate, args.block_size)
        .wrap_err("invalid engine configuration")?;
    tracing::info!(
        sample_rate,
        channels,
        block_size = config.block_size(),
        "audio device opened"
    );

    let (mut voice, handle) = voice_channel(config, CONTROL_QUEUE_SIZE);
    let (mut audio_tx, audio_rx) = RingBuffer::<f32>::new(VIS_BUFFER_SIZE * AUDIO_RING_WINDOWS);
    let (mut meter_tx, meter_rx) = RingBuffer::<VoiceMeter>::new(METER_QUEUE_SIZE);

    let stream = device
        .build_output_stream(
            &supported.into(),
            move |data: &mut [f32], _| {
                voice.render_interleaved(data, channels);

                // The UI may fall behind; drop rather than wait.
                for frame in data.chunks_exact(channels) {
                    let _ = audio_tx.push(frame[0]);
                }
                let _ = meter_tx.push(voice.meter());
            },
            |err| tracing::error!(%err, "audio stream error"),
            None,
        )
        .wrap_err("failed to build output stream")?;

    stream.play().wrap_err("failed to start output stream")?;

    let mut ui = UiApp::new(handle, audio_rx, meter_rx, config, args.octave);
    ui.run(terminal)
}
