//! Fixed prompt fragments selectable from the client.
//!
//! Lookups are permissive: an unknown or missing key resolves to the default
//! preset instead of failing the request.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Style {
    #[default]
    Clean,
    Film,
    Corporate,
    Modern,
    ColorPop,
    Bw,
}

impl Style {
    #[cfg(test)]
    const ALL: [Style; 6] = [
        Style::Clean,
        Style::Film,
        Style::Corporate,
        Style::Modern,
        Style::ColorPop,
        Style::Bw,
    ];

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "clean" => Some(Style::Clean),
            "film" => Some(Style::Film),
            "corporate" => Some(Style::Corporate),
            "modern" => Some(Style::Modern),
            "colorpop" => Some(Style::ColorPop),
            "bw" => Some(Style::Bw),
            _ => None,
        }
    }

    pub fn resolve(key: Option<&str>) -> Self {
        key.and_then(Self::from_key).unwrap_or_default()
    }

    pub fn key(self) -> &'static str {
        match self {
            Style::Clean => "clean",
            Style::Film => "film",
            Style::Corporate => "corporate",
            Style::Modern => "modern",
            Style::ColorPop => "colorpop",
            Style::Bw => "bw",
        }
    }

    pub fn phrase(self) -> &'static str {
        match self {
            Style::Clean => {
                "studio headshot, natural soft light, 50mm lens, neutral background, realistic skin texture, subtle makeup, professional portrait photography"
            }
            Style::Film => {
                "cinematic portrait, Kodak Portra 400 film look, soft grain, rim light, shallow depth of field, realistic"
            }
            Style::Corporate => {
                "professional business headshot, blazer, plain background, soft key light, linkedin profile style, realistic"
            }
            Style::Modern => {
                "minimal studio headshot, gradient background, soft rim lighting, high-end magazine style, realistic"
            }
            Style::ColorPop => "vibrant colored backdrop, beauty lighting, studio portrait, realistic",
            Style::Bw => "black and white portrait, high contrast, studio lighting, realistic",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Composition {
    #[default]
    Half,
    Full,
}

impl Composition {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "half" => Some(Composition::Half),
            "full" => Some(Composition::Full),
            _ => None,
        }
    }

    pub fn resolve(key: Option<&str>) -> Self {
        key.and_then(Self::from_key).unwrap_or_default()
    }

    pub fn key(self) -> &'static str {
        match self {
            Composition::Half => "half",
            Composition::Full => "full",
        }
    }

    pub fn phrase(self) -> &'static str {
        match self {
            Composition::Half => "from waist up, centered composition, looking at camera",
            Composition::Full => "full-length portrait, balanced composition, standing pose",
        }
    }
}
