use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgba;

pub struct ThemeColors {
    pub guide: Srgba<f64>,
    pub watermark: Srgba<f64>,
    pub remove_zone: Srgba<f64>,
    pub remove_text: Srgba<f64>,
    pub string_hole: Srgba<f64>,
    pub shine: Srgba<f64>,
}

impl ThemeColors {
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        Self {
            guide: Self::lookup_color(
                context,
                "borders",
                Srgba::new(0.898, 0.906, 0.922, 1.0),
                Some(1.0),
            ),
            watermark: Self::lookup_color(
                context,
                "theme_fg_color",
                Srgba::new(0.122, 0.161, 0.216, 0.3),
                Some(0.3),
            ),
            remove_zone: Self::lookup_color(
                context,
                "error_bg_color",
                Srgba::new(0.996, 0.886, 0.886, 0.35),
                Some(0.35),
            ),
            remove_text: Self::lookup_color(
                context,
                "error_fg_color",
                Srgba::new(0.988, 0.647, 0.647, 0.9),
                Some(0.9),
            ),
            string_hole: Srgba::new(1.0, 1.0, 1.0, 0.4),
            shine: Srgba::new(1.0, 1.0, 1.0, 0.3),
        }
    }

    fn lookup_color(
        context: &gtk::StyleContext,
        name: &str,
        fallback: Srgba<f64>,
        alpha_override: Option<f64>,
    ) -> Srgba<f64> {
        context
            .lookup_color(name)
            .map(|c| {
                let (r, g, b, a) = (
                    c.red() as f64,
                    c.green() as f64,
                    c.blue() as f64,
                    c.alpha() as f64,
                );
                Srgba::new(r, g, b, alpha_override.unwrap_or(a))
            })
            .unwrap_or(fallback)
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.loopstone-window {
    background-color: #ffffff;
}
.loopstone-canvas {
    background: none;
    background-color: transparent;
}
.loopstone-toast {
    background-color: alpha(#111827, 0.9);
    color: #ffffff;
    border-radius: 999px;
    padding: 8px 24px;
    font-weight: 500;
}
.loopstone-selector {
    background-color: #f9fafb;
    border-top: 1px solid #e5e7eb;
}
.loopstone-category {
    font-weight: 300;
    padding: 12px 8px;
}
.loopstone-product {
    background-color: #ffffff;
    border: 1px solid #f3f4f6;
    border-radius: 12px;
    padding: 8px;
}
.loopstone-product-name {
    font-size: 11px;
}
.loopstone-product-price {
    font-size: 9px;
    font-family: monospace;
    color: #9ca3af;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
