//! Color filters available to templates.
//!
//! Colors travel through templates as hex strings: `#rrggbb`, or `#rrggbbaa`
//! once an alpha channel has been attached. Filters that produce colors
//! return strings in the same form so they can be chained.

use minijinja::value::Rest;
use minijinja::{Environment, Error, ErrorKind, Value};

use crate::color::Color;

/// Signature shared by every template filter: the piped value plus any
/// positional arguments.
pub type FilterFn = fn(&Value, &[Value]) -> Result<Value, Error>;

const DEFAULT_AMOUNT: f64 = 0.1;
const DEFAULT_MIX_RATIO: f64 = 0.5;

/// Name → function mapping handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct FilterTable {
    entries: &'static [(&'static str, FilterFn)],
}

impl FilterTable {
    pub fn standard() -> Self {
        Self { entries: STANDARD }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn get(&self, name: &str) -> Option<FilterFn> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, f)| *f)
    }

    /// Register every filter on a minijinja environment.
    pub fn register(&self, env: &mut Environment<'static>) {
        for &(name, filter) in self.entries {
            env.add_filter(name, move |value: Value, args: Rest<Value>| {
                filter(&value, &args)
            });
        }
    }
}

static STANDARD: &[(&str, FilterFn)] = &[
    ("hex", hex),
    ("rgb", rgb),
    ("rgba", rgba),
    ("hsl", hsl),
    ("hsla", hsla),
    ("darken", darken),
    ("lighten", lighten),
    ("saturate", saturate),
    ("desaturate", desaturate),
    ("alpha", alpha),
    ("mix", mix),
    ("luminance", luminance),
    ("contrast", contrast),
    ("is_dark", is_dark),
    ("is_light", is_light),
    ("complement", complement),
    ("triad", triad),
    ("analogous", analogous),
    ("css_var", css_var),
    ("rasi_var", rasi_var),
    ("shell_var", shell_var),
];

/// A template color: sRGB plus an optional alpha byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TemplateColor {
    color: Color,
    alpha: Option<u8>,
}

impl TemplateColor {
    fn parse(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('#')?;
        if !digits.is_ascii() {
            return None;
        }
        match digits.len() {
            6 => Some(Self {
                color: Color::from_hex(digits).ok()?,
                alpha: None,
            }),
            8 => Some(Self {
                color: Color::from_hex(&digits[..6]).ok()?,
                alpha: Some(u8::from_str_radix(&digits[6..], 16).ok()?),
            }),
            _ => None,
        }
    }

    fn map(self, f: impl FnOnce(Color) -> Color) -> Self {
        Self {
            color: f(self.color),
            alpha: self.alpha,
        }
    }

    fn alpha_fraction(self) -> f64 {
        self.alpha.map_or(1.0, |a| a as f64 / 255.0)
    }

    fn to_hex(self) -> String {
        match self.alpha {
            Some(a) => format!("{}{a:02x}", self.color.to_hex()),
            None => self.color.to_hex(),
        }
    }
}

impl From<TemplateColor> for Value {
    fn from(color: TemplateColor) -> Self {
        Value::from(color.to_hex())
    }
}

fn invalid(message: String) -> Error {
    Error::new(ErrorKind::InvalidOperation, message)
}

fn color_arg(value: &Value, what: &str) -> Result<TemplateColor, Error> {
    value
        .as_str()
        .and_then(TemplateColor::parse)
        .ok_or_else(|| invalid(format!("{what} is not a color: {value}")))
}

fn number_arg(args: &[Value], index: usize, name: &str) -> Result<Option<f64>, Error> {
    match args.get(index) {
        None => Ok(None),
        Some(value) if value.is_none() || value.is_undefined() => Ok(None),
        Some(value) => f64::try_from(value.clone())
            .map(Some)
            .map_err(|_| invalid(format!("{name} must be a number, got {value}"))),
    }
}

fn string_arg<'a>(args: &'a [Value], index: usize, name: &str) -> Result<&'a str, Error> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(format!("missing {name} argument")))
}

fn hex(value: &Value, _args: &[Value]) -> Result<Value, Error> {
    Ok(color_arg(value, "value")?.into())
}

fn rgb(value: &Value, _args: &[Value]) -> Result<Value, Error> {
    let Color { r, g, b } = color_arg(value, "value")?.color;
    Ok(Value::from(format!("rgb({r}, {g}, {b})")))
}

fn rgba(value: &Value, args: &[Value]) -> Result<Value, Error> {
    let color = color_arg(value, "value")?;
    let a = number_arg(args, 0, "alpha")?.unwrap_or_else(|| color.alpha_fraction());
    let Color { r, g, b } = color.color;
    Ok(Value::from(format!("rgba({r}, {g}, {b}, {a:.2})")))
}

fn hsl_parts(color: Color) -> (f32, f32, f32) {
    let hsl = color.to_hsl();
    (
        hsl.hue.into_positive_degrees(),
        hsl.saturation * 100.0,
        hsl.lightness * 100.0,
    )
}

fn hsl(value: &Value, _args: &[Value]) -> Result<Value, Error> {
    let (h, s, l) = hsl_parts(color_arg(value, "value")?.color);
    Ok(Value::from(format!("hsl({h:.0}, {s:.0}%, {l:.0}%)")))
}

fn hsla(value: &Value, args: &[Value]) -> Result<Value, Error> {
    let color = color_arg(value, "value")?;
    let a = number_arg(args, 0, "alpha")?.unwrap_or_else(|| color.alpha_fraction());
    let (h, s, l) = hsl_parts(color.color);
    Ok(Value::from(format!("hsla({h:.0}, {s:.0}%, {l:.0}%, {a:.2})")))
}

fn amount(args: &[Value]) -> Result<f32, Error> {
    Ok(number_arg(args, 0, "amount")?.unwrap_or(DEFAULT_AMOUNT) as f32)
}

fn darken(value: &Value, args: &[Value]) -> Result<Value, Error> {
    let amount = amount(args)?;
    Ok(color_arg(value, "value")?
        .map(|c| c.shift_hsl_lightness(-amount))
        .into())
}

fn lighten(value: &Value, args: &[Value]) -> Result<Value, Error> {
    let amount = amount(args)?;
    Ok(color_arg(value, "value")?
        .map(|c| c.shift_hsl_lightness(amount))
        .into())
}

fn saturate(value: &Value, args: &[Value]) -> Result<Value, Error> {
    let amount = amount(args)?;
    Ok(color_arg(value, "value")?
        .map(|c| c.shift_hsl_saturation(amount))
        .into())
}

fn desaturate(value: &Value, args: &[Value]) -> Result<Value, Error> {
    let amount = amount(args)?;
    Ok(color_arg(value, "value")?
        .map(|c| c.shift_hsl_saturation(-amount))
        .into())
}

/// Attach an alpha channel. Values up to 1.0 are fractions, larger values
/// are taken as a byte.
fn alpha(value: &Value, args: &[Value]) -> Result<Value, Error> {
    let color = color_arg(value, "value")?;
    let a = number_arg(args, 0, "alpha")?.ok_or_else(|| invalid("missing alpha argument".into()))?;
    let byte = if a <= 1.0 { a * 255.0 } else { a };
    Ok(TemplateColor {
        alpha: Some(byte.round().clamp(0.0, 255.0) as u8),
        ..color
    }
    .into())
}

fn mix(value: &Value, args: &[Value]) -> Result<Value, Error> {
    let color = color_arg(value, "value")?;
    let other = color_arg(
        args.first()
            .ok_or_else(|| invalid("mix needs a second color".into()))?,
        "mix argument",
    )?;
    let ratio = number_arg(args, 1, "ratio")?.unwrap_or(DEFAULT_MIX_RATIO) as f32;
    Ok(color.map(|c| c.mix(other.color, ratio)).into())
}

fn luminance(value: &Value, _args: &[Value]) -> Result<Value, Error> {
    let color = color_arg(value, "value")?.color;
    Ok(Value::from(color.relative_luminance() as f64))
}

fn contrast(value: &Value, args: &[Value]) -> Result<Value, Error> {
    let color = color_arg(value, "value")?.color;
    let other = color_arg(
        args.first()
            .ok_or_else(|| invalid("contrast needs a second color".into()))?,
        "contrast argument",
    )?
    .color;
    Ok(Value::from(Color::contrast_ratio(&color, &other) as f64))
}

fn is_dark(value: &Value, _args: &[Value]) -> Result<Value, Error> {
    Ok(Value::from(color_arg(value, "value")?.color.is_dark()))
}

fn is_light(value: &Value, _args: &[Value]) -> Result<Value, Error> {
    Ok(Value::from(!color_arg(value, "value")?.color.is_dark()))
}

fn complement(value: &Value, _args: &[Value]) -> Result<Value, Error> {
    Ok(color_arg(value, "value")?
        .map(|c| c.rotate_hsl_hue(180.0))
        .into())
}

fn rotations(value: &Value, offsets: [f32; 3]) -> Result<Value, Error> {
    let color = color_arg(value, "value")?;
    let colors: Vec<String> = offsets
        .iter()
        .map(|&offset| color.map(|c| c.rotate_hsl_hue(offset)).to_hex())
        .collect();
    Ok(Value::from(colors))
}

fn triad(value: &Value, _args: &[Value]) -> Result<Value, Error> {
    rotations(value, [0.0, 120.0, 240.0])
}

fn analogous(value: &Value, _args: &[Value]) -> Result<Value, Error> {
    rotations(value, [-30.0, 0.0, 30.0])
}

fn css_var(value: &Value, args: &[Value]) -> Result<Value, Error> {
    let color = color_arg(value, "value")?;
    let name = string_arg(args, 0, "variable name")?;
    Ok(Value::from(format!("--{name}: {};", color.to_hex())))
}

fn rasi_var(value: &Value, args: &[Value]) -> Result<Value, Error> {
    let color = color_arg(value, "value")?;
    let name = string_arg(args, 0, "variable name")?;
    Ok(Value::from(format!("@define-color {name} {};", color.to_hex())))
}

fn shell_var(value: &Value, args: &[Value]) -> Result<Value, Error> {
    let color = color_arg(value, "value")?;
    let name = string_arg(args, 0, "variable name")?;
    Ok(Value::from(format!("{name}='{}'", color.to_hex())))
}
