//! Style categories and their preset catalogues.

use std::fmt;
use std::str::FromStr;

/// Closed set of style domains used to scope presets and prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    Hair,
    Makeup,
    Nails,
    Scene,
    Wardrobe,
    LuxuryCars,
    General,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Hair,
        Category::Makeup,
        Category::Nails,
        Category::Scene,
        Category::Wardrobe,
        Category::LuxuryCars,
        Category::General,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Hair => "Hair",
            Category::Makeup => "Makeup",
            Category::Nails => "Nails",
            Category::Scene => "Scene",
            Category::Wardrobe => "Wardrobe",
            Category::LuxuryCars => "Luxury Cars",
            Category::General => "General",
        }
    }

    pub fn presets(&self) -> &'static [&'static str] {
        match self {
            Category::Hair => HAIR_PRESETS,
            Category::Makeup => MAKEUP_PRESETS,
            Category::Nails => NAILS_PRESETS,
            Category::Scene => SCENE_PRESETS,
            Category::Wardrobe => WARDROBE_PRESETS,
            Category::LuxuryCars => LUXURY_CAR_PRESETS,
            Category::General => GENERAL_PRESETS,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown category '{0}'. Expected one of: Hair, Makeup, Nails, Scene, Wardrobe, Luxury Cars, General")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Case-insensitive; spaces, dashes and underscores are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.label().replace(' ', "").to_lowercase() == normalized)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Resolve a preset given either its 1-based index or its (case-insensitive) name.
pub fn resolve_choice(choices: &[&'static str], input: &str) -> Option<&'static str> {
    let input = input.trim();
    if let Ok(n) = input.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| choices.get(i)).copied();
    }
    choices
        .iter()
        .find(|c| c.eq_ignore_ascii_case(input))
        .copied()
}

const HAIR_PRESETS: &[&str] = &[
    "Voluminous 90s Blowout",
    "Sleek Glass Hair Bob",
    "Short Pixie Cut",
    "Long Flowing Layers",
    "Edgy Mohawk Style",
    "Natural Wavy Texture",
    "Chocolate with Blonde Highlights",
    "Platinum Blonde Beach Waves",
    "Textured Afro with Baby Hairs",
    "Honey Blonde Balayage",
    "Copper Red Layers",
    "High Fashion Ponytail",
    "Bohemian Braids",
];

const MAKEUP_PRESETS: &[&str] = &[
    "Clean Girl Aesthetic (Dewy)",
    "Full Matte Finish",
    "Sharp Cut Crease Eyeshadow",
    "Classic Red Lip & Winged Liner",
    "Soft Glam (Bridal)",
    "Smokey Eye Evening Look",
    "Avant-Garde Editorial",
    "Y2K Glossy Lip",
    "Matte Nude Monochrome",
    "Glass Skin Natural",
];

const NAILS_PRESETS: &[&str] = &[
    "Long Stiletto Shape",
    "Classic Long Square",
    "Short Natural Round",
    "Glazed Donut Chrome",
    "Classic French Tip",
    "Deep Red Stiletto",
    "Milky White Almond",
    "Matte Black with Gold Foil",
    "Tortoise Shell Design",
    "Holiday Sparkle & Gems",
    "Neon Pop Art",
];

const SCENE_PRESETS: &[&str] = &[
    "Winter Wonderland Aspen",
    "Luxury Rooftop Bar at Sunset",
    "High-End Spa Interior",
    "City Streets NYC/Paris",
    "Holiday Decorated Mansion",
    "Tropical Resort Poolside",
    "Minimalist Photo Studio",
    "Private Jet Cabin",
];

const WARDROBE_PRESETS: &[&str] = &[
    "Quiet Luxury Cashmere",
    "Silk Evening Gown",
    "Structured Power Suit",
    "White Lab Coat (Professional)",
    "Medical Scrubs (Chic & Fitted)",
    "Designer Streetwear",
    "Chic Winter Coat & Scarf",
    "Athleisure Yoga Set",
    "Cocktail Party Dress",
    "Haute Couture Runway",
    "Vintage Chanel Tweed Suit",
    "Red Carpet Gala Gown",
    "Old Money Tennis Aesthetic",
    "High-End Resort Wear",
    "Metallic Futurism Bodysuit",
    "Velvet Tuxedo Jacket",
    "Oversized Faux Fur Coat",
    "Parisian Chic Trench Coat",
];

const LUXURY_CAR_PRESETS: &[&str] = &[
    "2025 Cadillac Escalade (Black)",
    "Chevy Tahoe High Country",
    "Mercedes-Maybach S-Class Two-Tone",
    "Porsche 911 GT3 RS",
    "Rolls-Royce Cullinan",
    "Lamborghini Urus",
    "Range Rover Autobiography",
    "Bentley Continental GT",
    "Ferrari SF90 Stradale",
    "Bugatti Chiron",
    "Rolls-Royce Spectre",
    "Mercedes-AMG G63 (G-Wagon)",
    "Aston Martin DB12",
    "McLaren 750S",
    "BMW i7 M70",
    "Audi RS e-tron GT",
];

const GENERAL_PRESETS: &[&str] = &[
    "Portrait",
    "Full Body",
    "Close Up",
    "Studio Lighting",
    "Outdoor",
    "Cinematic",
    "Black and White",
    "Candid",
];

/// Camera motion presets for animation.
pub const MOTION_PRESETS: &[&str] = &[
    "Slow motion hair flip and smile",
    "Walking confidently towards camera",
    "Stepping out of the luxury car",
    "Sipping champagne in slow motion",
    "Applying lip gloss in the mirror",
    "Turning head to look over shoulder",
    "Walking through falling snow",
    "City lights blurring in background",
];

/// Lighting and atmosphere presets for animation.
pub const CINEMATIC_VIBES: &[&str] = &[
    "Golden Hour Sun Flare",
    "Moody Night Club Neon",
    "Clean Bright Commercial",
    "Soft Dreamy Focus",
    "Paparazzi Flash",
];

/// Free-text suggestions for `/inspire`.
pub const INSPIRATION_PROMPTS: &[&str] = &[
    "Golden hour lighting with a soft dreamy haze, editorial fashion style.",
    "Cyberpunk neon city background, wet streets, futuristic vibe.",
    "Classic Hollywood glamour, black and white photography, high contrast.",
    "Ethereal forest setting with sunlight filtering through trees.",
    "Minimalist studio setting with dramatic side lighting.",
    "Vibrant pop-art colors, bold makeup, high energy.",
    "Snow falling softly around, cozy winter luxury aesthetic.",
    "Sunset on a private yacht, ocean breeze, lifestyle photography.",
];

/// Pick a random inspiration prompt.
pub fn random_inspiration() -> &'static str {
    use rand::seq::IndexedRandom;
    INSPIRATION_PROMPTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(INSPIRATION_PROMPTS[0])
}
