//! Prompt templates sent to the generation models.

/// Critique used when the model answers with empty text.
pub const CRITIQUE_EMPTY_FALLBACK: &str = "This look shows off a distinctive personal style!";
/// Critique used when the critique call fails outright.
pub const CRITIQUE_ERROR_FALLBACK: &str = "Fashion is freedom, and this pairing has real potential!";

pub fn enhance_prompt(input: &str) -> String {
    format!(
        "You are a high-end fashion designer. Rewrite the user's idea below into a detailed, \
         professional fashion photography prompt for an image model. Cover material texture, \
         lighting, cut, styling details and accurate color. Stay under 40 words.\n\
         User idea: \"{input}\"\n\
         Reply with the enhanced English prompt only."
    )
}

pub fn garment_prompt(prompt: &str) -> String {
    format!(
        "Professional fashion catalog photograph of {prompt}, isolated on a white background, \
         studio lighting, high resolution."
    )
}

pub const TRY_ON_INSTRUCTIONS: &str = "\
Virtual try-on.
Image 1 is the model. Image 2 is the garment.
- Produce a photorealistic image of the model from image 1 wearing the garment from image 2.
- The garment must be worn on the body, following its shape, never placed beside the model.
- Replace the clothing the model currently wears in the garment's region.
- Keep the model's face, hair, head shape and skin tone unchanged.
- Natural folds, shadows and fit for the pose. Editorial fashion style.";

pub const CRITIQUE_INSTRUCTIONS: &str = "\
You are the editor-in-chief of a fashion magazine.
Image 1 shows a person, image 2 shows a garment. Imagine the person wearing it.
Write a 50 to 80 word critique: professional, sharp and a little witty. Comment on the style, \
the occasions it suits and the mood it creates.";
