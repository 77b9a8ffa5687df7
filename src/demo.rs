//! Canned station scenarios rendered to audio files

use std::path::{Path, PathBuf};

use crate::emergency::LocationInfo;
use crate::responder::VoiceResponder;
use crate::{Error, Result};

/// A line of speech and the file it is saved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clip {
    pub file_name: String,
    pub text: String,
}

impl Clip {
    fn new(file_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            text: text.into(),
        }
    }
}

/// One exchange in the scripted booking conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turn {
    pub user: &'static str,
    pub system: &'static str,
}

pub const WELCOME: &str = "Selamat datang di KAI Pandu. \
Saya siap membantu perjalanan Anda hari ini. \
Katakan 'Pesan Tiket' untuk membeli tiket kereta, atau 'Bantuan' jika Anda memerlukan panduan.";

pub const TICKET_OPTIONS: &str = "Ada pilihan kereta Argo Lawu jam 07:30 dan Taksaka jam 09:00. \
Harga mulai dari 150 ribu rupiah. Mau pilih yang mana?";

pub const SEAT_FOUND: &str =
    "Kursi 14A ditemukan di sisi kanan Anda. Tiga langkah lagi, kemudian Anda bisa duduk.";

pub const ARRIVAL: &str = "Stasiun Yogyakarta akan segera tiba dalam 5 menit. \
Silakan siapkan barang bawaan Anda dan bersiap untuk turun.";

/// Scripted ticket booking, one rider line and one reply per turn
pub const CONVERSATION: [Turn; 4] = [
    Turn {
        user: "Saya ingin pesan tiket dari Gambir ke Yogyakarta",
        system: "Baik, saya cari jadwal kereta dari Gambir ke Yogyakarta. \
                 Ada kereta Argo Lawu jam 07:30 dan Taksaka jam 09:00. \
                 Untuk tanggal kapan Anda ingin berangkat?",
    },
    Turn {
        user: "Besok pagi",
        system: "Baik, untuk besok pagi saya rekomendasikan Argo Lawu jam 07:30. \
                 Mau pilih kelas ekonomi atau eksekutif?",
    },
    Turn {
        user: "Ekonomi saja",
        system: "Baik, kelas ekonomi. Harganya 150 ribu rupiah. \
                 Apakah Anda ingin melanjutkan ke pembayaran?",
    },
    Turn {
        user: "Ya, lanjutkan",
        system: "Baik, saya akan proses pembayaran. \
                 Pilih metode pembayaran: Transfer Bank, E-wallet, atau KAI Pay?",
    },
];

/// Greeting in each supported language mix
pub const MULTILINGUAL: [(&str, &str); 3] = [
    (
        "indonesian",
        "Selamat datang di KAI Pandu. Kami siap membantu perjalanan Anda.",
    ),
    (
        "english",
        "Welcome to KAI Pandu. We are ready to assist your journey.",
    ),
    (
        "mixed",
        "Welcome ke KAI Pandu. Kami ready untuk help your journey today.",
    ),
];

/// Rider location used by the emergency scenario
#[must_use]
pub fn demo_location() -> LocationInfo {
    LocationInfo {
        user_id: Some("user_123".to_string()),
        location: Some("Platform 2, near Gate 5".to_string()),
        platform: Some("2".to_string()),
    }
}

/// The six journey scenarios, from welcome to emergency
///
/// The emergency scenario raises a real alert through the responder's sink.
///
/// # Errors
///
/// Returns error if the wayfinding text cannot be produced
pub async fn journey_clips(responder: &VoiceResponder) -> Result<Vec<Clip>> {
    let wayfinding = responder.wayfinding_guidance("Peron 3", 25.0)?;
    let emergency = responder.emergency_assistance(&demo_location()).await;

    Ok(vec![
        Clip::new("01_welcome.mp3", WELCOME),
        Clip::new("02_ticket_options.mp3", TICKET_OPTIONS),
        Clip::new("03_wayfinding.mp3", wayfinding),
        Clip::new("04_seat_finding.mp3", SEAT_FOUND),
        Clip::new("05_arrival_alert.mp3", ARRIVAL),
        Clip::new("06_emergency.mp3", emergency),
    ])
}

/// System replies of the scripted conversation
#[must_use]
pub fn conversation_clips() -> Vec<Clip> {
    CONVERSATION
        .iter()
        .enumerate()
        .map(|(idx, turn)| Clip::new(format!("conversation_turn_{}.mp3", idx + 1), turn.system))
        .collect()
}

/// One greeting per language
#[must_use]
pub fn multilingual_clips() -> Vec<Clip> {
    MULTILINGUAL
        .iter()
        .map(|(language, text)| Clip::new(format!("multilingual_{language}.mp3"), *text))
        .collect()
}

/// Outcome of rendering clips
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DemoReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

impl DemoReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Render clips into `out_dir`
///
/// Each clip is best effort; failures are collected in the report.
///
/// # Errors
///
/// Returns `InvalidInput` if `out_dir` is not an existing directory
pub async fn render(
    responder: &VoiceResponder,
    clips: &[Clip],
    out_dir: &Path,
) -> Result<DemoReport> {
    ensure_dir(out_dir)?;

    let mut report = DemoReport::default();
    for clip in clips {
        let path = out_dir.join(&clip.file_name);
        if responder.synthesize_to_file(&clip.text, &path).await {
            report.written.push(path);
        } else {
            report.failed.push(path);
        }
    }

    Ok(report)
}

/// Render every scenario: journey, conversation and multilingual
///
/// # Errors
///
/// Returns error if `out_dir` is not a directory or a scenario cannot be built
pub async fn run_all(responder: &VoiceResponder, out_dir: &Path) -> Result<DemoReport> {
    ensure_dir(out_dir)?;

    let mut clips = journey_clips(responder).await?;
    clips.extend(conversation_clips());
    clips.extend(multilingual_clips());

    tracing::info!(clips = clips.len(), out_dir = %out_dir.display(), "rendering demo scenarios");

    let report = render(responder, &clips, out_dir).await?;
    tracing::info!(
        written = report.written.len(),
        failed = report.failed.len(),
        "demo scenarios finished"
    );

    Ok(report)
}

fn ensure_dir(out_dir: &Path) -> Result<()> {
    if out_dir.is_dir() {
        return Ok(());
    }

    Err(Error::InvalidInput(format!(
        "output directory does not exist: {}",
        out_dir.display()
    )))
}
