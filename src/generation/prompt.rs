//! Text builders for a single decoration variation: the image prompt, the
//! user-facing description and the added/modified element lists.
//!
//! Variations are numbered from 1; higher numbers depart further from the
//! existing room.

use crate::analysis::RoomAnalysis;
use crate::models::DecorationRequest;
use crate::style::DesignStyle;

pub fn decoration_prompt(
    style: DesignStyle,
    analysis: &RoomAnalysis,
    request: &DecorationRequest,
    variation: usize,
) -> String {
    let mut prompt = format!(
        "Interior design makeover of a {} in {} style. {}. ",
        analysis.room_type.to_lowercase(),
        style.display_name(),
        style.description()
    );

    prompt.push_str(&format!(
        "Current room has: {} with {} lighting and {} color scheme. ",
        analysis.detected_elements.join(", "),
        analysis.lighting.to_lowercase(),
        analysis.color_scheme.to_lowercase()
    ));

    prompt.push_str(match variation {
        1 => "Focus on maintaining existing furniture while adding decorative elements. ",
        2 => "Blend existing furniture with new complementary pieces. ",
        3 => "Bold transformation with creative furniture arrangement. ",
        _ => "",
    });

    if let Some(color) = request.color_preference.as_deref().filter(|c| !c.is_empty()) {
        prompt.push_str(&format!("Incorporate {} colors. ", color));
    }

    if request.preserve_existing_furniture {
        prompt.push_str("Preserve and enhance existing furniture. ");
    }

    prompt.push_str("High quality, realistic, well-lit interior photograph.");
    prompt
}

pub fn option_description(style: DesignStyle, analysis: &RoomAnalysis, variation: usize) -> String {
    let name = style.display_name();
    let lower = name.to_lowercase();
    let mut desc = format!(
        "This {} design transforms your {} with ",
        name,
        analysis.room_type.to_lowercase()
    );

    match variation {
        1 => desc.push_str(&format!(
            "subtle enhancements that complement your existing furniture. \
             Added decorative elements maintain the room's current character while introducing {} aesthetics.",
            lower
        )),
        2 => desc.push_str(&format!(
            "a balanced approach mixing your current pieces with new complementary furniture. \
             The design creates harmony between existing and new elements in true {} fashion.",
            lower
        )),
        3 => desc.push_str(&format!(
            "a bold reimagining of the space with creative furniture arrangements. \
             This variation embraces the full potential of {} design principles.",
            lower
        )),
        _ => {}
    }

    desc
}

pub fn added_elements(style: DesignStyle, variation: usize) -> Vec<String> {
    let extra: [&str; 2] = match variation {
        1 => ["Wall art", "Decorative plants"],
        2 => ["Area rug", "Accent furniture"],
        _ => ["Statement pieces", "Architectural elements"],
    };

    style
        .signature_elements()
        .into_iter()
        .chain(extra)
        .map(str::to_string)
        .collect()
}

pub fn modified_elements(variation: usize) -> Vec<String> {
    let mut modified = vec!["Wall color", "Lighting arrangement", "Furniture positioning"];

    if variation > 1 {
        modified.extend(["Flooring treatment", "Window treatments"]);
    }
    if variation == 3 {
        modified.extend(["Room layout", "Architectural features"]);
    }

    modified.into_iter().map(str::to_string).collect()
}
