use eframe::egui;
use std::path::Path;
use std::sync::Arc;

/// egui's bundled fonts have no Hangul; borrow one from the system.
const HANGUL_FONT_CANDIDATES: [&str; 7] = [
    "/usr/share/fonts/truetype/nanum/NanumGothic.ttf",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/System/Library/Fonts/AppleSDGothicNeo.ttc",
    "C:\\Windows\\Fonts\\malgun.ttf",
    "C:\\Windows\\Fonts\\gulim.ttc",
];

pub fn install_hangul_font(ctx: &egui::Context) {
    let Some((path, bytes)) = HANGUL_FONT_CANDIDATES
        .iter()
        .find_map(|p| std::fs::read(p).ok().map(|bytes| (*p, bytes)))
    else {
        tracing::warn!("no Hangul font found; Korean text may not render");
        return;
    };

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("hangul".into(), Arc::new(egui::FontData::from_owned(bytes)));

    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts.families.entry(family).or_default().push("hangul".into());
    }

    ctx.set_fonts(fonts);
    tracing::info!(font = %Path::new(path).display(), "hangul font installed");
}
