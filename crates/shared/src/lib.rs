use serde::{Deserialize, Serialize};

pub mod wire;

pub use wire::{
    GenerateOutcome, GenerateRequest, GenerateResponse, GenerationResult, GenerationStatus,
    ImageGenerateResponse,
};

/// Шрифт по умолчанию (typeface JSON из набора three.js)
pub const DEFAULT_FONT: &str =
    "https://threejs.org/examples/fonts/helvetiker_regular.typeface.json";

/// Текст таблички, если пользователь оставил поле пустым
pub const DEFAULT_PLAQUE_TEXT: &str = "Trophy";

/// Режим генерации: активен ровно один
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    #[default]
    Ai,
    Text,
    Image,
    Shapes,
}

impl GenerationMode {
    pub fn all() -> &'static [GenerationMode] {
        &[
            GenerationMode::Ai,
            GenerationMode::Text,
            GenerationMode::Image,
            GenerationMode::Shapes,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GenerationMode::Ai => "AI Generation",
            GenerationMode::Text => "3D Text",
            GenerationMode::Image => "Image to 3D",
            GenerationMode::Shapes => "Shapes",
        }
    }

    /// Режим обращается к бэкенду (а не строит геометрию локально)
    pub fn uses_backend(&self) -> bool {
        matches!(self, GenerationMode::Ai | GenerationMode::Image)
    }
}

/// Тип параметрической фигуры
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Cube,
    Cylinder,
    Hexagon,
    Trophy,
}

impl ShapeKind {
    pub fn all() -> &'static [ShapeKind] {
        &[
            ShapeKind::Cube,
            ShapeKind::Cylinder,
            ShapeKind::Hexagon,
            ShapeKind::Trophy,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ShapeKind::Cube => "Cube",
            ShapeKind::Cylinder => "Cylinder",
            ShapeKind::Hexagon => "Hexagon",
            ShapeKind::Trophy => "Trophy",
        }
    }
}

/// Параметры фигуры. Все размеры в сантиметрах.
///
/// Ширина/высота/глубина должны быть конечными и > 0; проверка на стороне UI,
/// сборщик геометрии их не ограничивает.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeSpec {
    pub kind: ShapeKind,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl Default for ShapeSpec {
    fn default() -> Self {
        Self {
            kind: ShapeKind::Cube,
            width: 10.0,
            height: 10.0,
            depth: 5.0,
        }
    }
}

impl ShapeSpec {
    /// Все размеры конечны и положительны
    pub fn is_renderable(&self) -> bool {
        [self.width, self.height, self.depth]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}

/// Параметры выдавленного текста. Размеры в сантиметрах.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpec {
    /// Пустая строка: ничего не рисуется
    pub content: String,
    /// Ссылка на typeface JSON (URL или путь к файлу)
    pub font: String,
    pub size: f64,
    pub depth: f64,
    #[serde(default)]
    pub letter_spacing: f64,
}

impl Default for TextSpec {
    fn default() -> Self {
        Self {
            content: "Fast3D".to_string(),
            font: DEFAULT_FONT.to_string(),
            size: 1.0,
            depth: 0.5,
            letter_spacing: 0.0,
        }
    }
}

impl TextSpec {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Размер и глубина конечны и > 0, межбуквенный интервал конечен
    pub fn is_renderable(&self) -> bool {
        [self.size, self.depth]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
            && self.letter_spacing.is_finite()
    }
}

/// Параметры режима AI
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AiParams {
    pub prompt: String,
}

/// Параметры режима Image-to-3D: пути к выбранным файлам
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageParams {
    pub front_image: Option<String>,
    pub back_image: Option<String>,
}

/// Параметры режима фигур: фигура + две надписи кубка
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapesParams {
    pub shape: ShapeSpec,
    pub plaque_text: TextSpec,
    pub base_text: TextSpec,
}

impl Default for ShapesParams {
    fn default() -> Self {
        Self {
            shape: ShapeSpec::default(),
            plaque_text: TextSpec {
                size: 1.2,
                depth: 0.2,
                ..TextSpec::new(DEFAULT_PLAQUE_TEXT)
            },
            base_text: TextSpec {
                size: 0.8,
                depth: 0.2,
                ..TextSpec::new("")
            },
        }
    }
}

/// Состояние всех режимов сразу: у каждого режима свои параметры,
/// переключение режима их не трогает.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModeParams {
    pub active: GenerationMode,
    #[serde(default)]
    pub ai: AiParams,
    #[serde(default)]
    pub text: TextSpec,
    #[serde(default)]
    pub image: ImageParams,
    #[serde(default)]
    pub shapes: ShapesParams,
}

/// Параметры активного режима (заимствованные)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActiveParams<'a> {
    Ai(&'a AiParams),
    Text(&'a TextSpec),
    Image(&'a ImageParams),
    Shapes(&'a ShapesParams),
}

impl ModeParams {
    pub fn active_params(&self) -> ActiveParams<'_> {
        match self.active {
            GenerationMode::Ai => ActiveParams::Ai(&self.ai),
            GenerationMode::Text => ActiveParams::Text(&self.text),
            GenerationMode::Image => ActiveParams::Image(&self.image),
            GenerationMode::Shapes => ActiveParams::Shapes(&self.shapes),
        }
    }

    /// Можно ли нажать «Generate» (без учёта флага загрузки)
    pub fn can_generate(&self) -> bool {
        match self.active_params() {
            ActiveParams::Ai(ai) => !ai.prompt.trim().is_empty(),
            ActiveParams::Image(image) => image.front_image.is_some(),
            ActiveParams::Text(_) | ActiveParams::Shapes(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_mode_keeps_other_records() {
        let mut params = ModeParams::default();
        params.ai.prompt = "a helmet".into();
        params.shapes.shape.width = 42.0;

        params.active = GenerationMode::Shapes;
        params.active = GenerationMode::Ai;

        assert_eq!(params.ai.prompt, "a helmet");
        assert_eq!(params.shapes.shape.width, 42.0);
    }

    #[test]
    fn can_generate_requires_prompt_or_front_image() {
        let mut params = ModeParams::default();
        assert!(!params.can_generate());
        params.ai.prompt = "   ".into();
        assert!(!params.can_generate());
        params.ai.prompt = "cyber helmet".into();
        assert!(params.can_generate());

        params.active = GenerationMode::Image;
        assert!(!params.can_generate());
        params.image.back_image = Some("back.png".into());
        assert!(!params.can_generate());
        params.image.front_image = Some("front.png".into());
        assert!(params.can_generate());

        params.active = GenerationMode::Shapes;
        assert!(!params.can_generate());
    }

    #[test]
    fn shape_spec_renderable() {
        assert!(ShapeSpec::default().is_renderable());
        let bad = ShapeSpec {
            width: 0.0,
            ..ShapeSpec::default()
        };
        assert!(!bad.is_renderable());
        let nan = ShapeSpec {
            depth: f64::NAN,
            ..ShapeSpec::default()
        };
        assert!(!nan.is_renderable());
    }

    #[test]
    fn text_spec_renderable() {
        assert!(TextSpec::default().is_renderable());
        let flat = TextSpec {
            depth: -0.5,
            ..TextSpec::default()
        };
        assert!(!flat.is_renderable());
        let spaced = TextSpec {
            letter_spacing: f64::INFINITY,
            ..TextSpec::default()
        };
        assert!(!spaced.is_renderable());
    }

    #[test]
    fn mode_params_json_uses_snake_case() {
        let mut params = ModeParams::default();
        params.active = GenerationMode::Shapes;
        params.shapes.shape.kind = ShapeKind::Trophy;

        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["active"], "shapes");
        assert_eq!(json["shapes"]["shape"]["kind"], "trophy");

        let partial: ModeParams =
            serde_json::from_str(r#"{ "active": "text", "text": { "content": "Hi", "font": "f.json", "size": 2.0, "depth": 1.0 } }"#)
                .unwrap();
        assert_eq!(partial.active, GenerationMode::Text);
        assert_eq!(partial.text.letter_spacing, 0.0);
        assert_eq!(partial.shapes, ShapesParams::default());
    }
}
