//! Prompt templates for every model call the pipeline makes

/// Topic analysis (fields 0-9)
pub fn topic_analysis(topic: &str) -> String {
    format!(
        "Deep analyze text from retail advertising, marketing psychology, and thoroughly researched marketing studies perspective: {topic}
Extract the following information:
0. Product: Product name, brand and supplier, logo, tagline, size, packaging if available
1. Objective: 1 word for primary goal of the banner. Example - Awareness, Engagement, Conversion, Branding
2. Festival: Event or occasion it may be tied to. Example - Christmas, Diwali, Black Friday, Summer Sale, New Year, Generic
3. Headline: Suggest a main text that captures attention. Example - Discover [product] for [festival], Shop now and save!, Limited time offer, Innovate your life with [product]
4. Subheadline: Optional additional supporting information to clarify the offer. Example - Get 50% off until [date], Exclusive deal for festive season, Hurry offer ends soon
5. CTA: Add a call to action. Example - Buy now, Shop the collection, Discover More, Sign up today
6. Color Scheme: Use color palette based on audience, occasion, or product tone. Example - Red & Gold (Festive, Urgency), Blue & White (Trust, Calm), Green & Brown (Eco-friendly, Natural), Black & White (Elegant, Minimal)
7. Promotional offer: Suggest 1 best promotional offer. Example - MAX ₹99 OFF, UP TO 60% OFF, UNDER ₹999, MIN ₹10 OFF, MIN 20% OFF, STARTS @₹99, FLAT ₹100 OFF, FLAT 20% OFF, ₹499 STORE, BUY 2 GET 1 FREE
8. Background color gradient: Dynamic color generation to match overall look and feel
9. Background theme: Festival oriented or generic if no festival
"
    )
}

/// Sent together with the reference images
pub const IMAGE_INSIGHTS: &str =
    "Examine the set of images to extract information about the product (name, logo) in less than 80 words.";

/// Consolidation of the raw analysis, optionally with product insights
pub fn consolidate(raw_extraction: &str, product_insights: Option<&str>) -> String {
    let mut prompt = format!(
        "Respond concisely and summarize in JSON dictionary format only this: {raw_extraction}"
    );
    if let Some(insights) = product_insights {
        prompt.push_str(" Product insights: ");
        prompt.push_str(insights);
    }
    prompt
}

/// Drop fields the consolidation could not fill
pub fn scrub_unavailable(consolidated: &str) -> String {
    format!(
        "Respond concisely by scrapping all unavailable information in JSON dictionary format only this: {consolidated}"
    )
}

/// Fill every remaining value into the final descriptor
pub fn fill_descriptor(cleaned: &str) -> String {
    format!(
        "Task: Fill in the values in this json: {cleaned}
Guidelines:
1. It will be used to generate an ads banner.
2. Ensure it has all details pair-wise meticulously captured.
3. All unknown/missing/unprovided variables are replaced with the attributes of the most probable shopper for that product.
4. Recheck and identify all ambiguity or any text that leads to uncertainty.
5. Replace all uncertainty with targeted values that make the most sense for the given product.
6. Quantify everything possible, like high, medium, and lows to percentage values based on marketing and psychometric research studies.
7. All KPIs and qualitative measures are to be used subcontextually only. Remove any details about statistical testing or names of any performance KPIs.
8. Avoid sentences and use only necessary keywords.
9. Remove all redundant key-value pairs.
"
    )
}

/// Image generation prompt
pub fn generate_banner(descriptor: &str) -> String {
    format!(
        "Realistic, subcontextually implied qualitative attributes inspired, excellent image quality ad capturing every detail in json:{descriptor}"
    )
}

/// Rubric for scoring the current image
pub fn critique(descriptor: &str, threshold: u8) -> String {
    format!(
        "Be direct. Quality check the banner out of 10 on:
1. Promotional offer present as per instructions below
2. Ensure ALL texts pass grammatical checks
3. Color pallette as per instructions below
4. Occassion or festival theme is present as per instructions below

ONLY USE INFORMATION FROM {descriptor}. Don't DO NOT make up colors, promo or occasion. Make sure the promo and color pallete is followed as per above instructions.

Precisely point out errors and corresponding actions to fix the image where score is below {threshold}.
Do not output anything about elements that need no change.
"
    )
}

/// First inpainting pass
pub fn repair(critique: &str) -> String {
    format!(
        "Realistic, subcontextually implied qualitative attributes inspired, excellent image quality ad by: {critique}"
    )
}

/// Second inpainting pass, after the quality re-check
pub fn repair_retest(critique: &str) -> String {
    format!(
        "Realistic, subcontextually implied qualitative attributes inspired, excellent image quality ad edit by: {critique}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_is_embedded() {
        let prompt = topic_analysis("Diwali Sale on Premium Ghee");
        assert!(prompt.starts_with("Deep analyze"));
        assert!(prompt.contains("perspective: Diwali Sale on Premium Ghee\n"));
        assert!(prompt.contains("9. Background theme"));
    }

    #[test]
    fn test_consolidate_appends_insights() {
        assert_eq!(
            consolidate("raw", None),
            "Respond concisely and summarize in JSON dictionary format only this: raw"
        );
        assert!(consolidate("raw", Some("cow logo")).ends_with("raw Product insights: cow logo"));
    }

    #[test]
    fn test_critique_uses_threshold() {
        let prompt = critique("{\"Festival\":\"Diwali\"}", 7);
        assert!(prompt.contains("ONLY USE INFORMATION FROM {\"Festival\":\"Diwali\"}."));
        assert!(prompt.contains("where score is below 7."));
        assert!(prompt.contains("Don't DO NOT make up colors, promo or occasion."));
    }

    #[test]
    fn test_repair_prompts_differ() {
        assert!(repair("fix").ends_with("ad by: fix"));
        assert!(repair_retest("fix").ends_with("ad edit by: fix"));
    }
}
