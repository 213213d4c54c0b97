pub const SYSTEM_PROMPT: &str = "You are a professional chef and recipe developer. \
Always respond with valid JSON arrays containing recipe objects.";

pub fn build_prompt(ingredients: &[String]) -> String {
    format!(
        r#"Create 3 unique and delicious recipes using these ingredients: {}.

For each recipe, provide:
1. A creative and appealing title
2. Complete ingredients list (including quantities)
3. Step-by-step cooking instructions
4. Estimated cooking time
5. Number of servings
6. Difficulty level (easy/medium/hard)
7. Brief nutrition information (calories, protein, etc.)

Respond with only a JSON array, no prose, where each recipe has these exact fields:
- title: string
- ingredients: array of strings with quantities
- instructions: array of strings (step by step)
- cooking_time: string (e.g., "30 minutes")
- servings: number
- difficulty: string (easy/medium/hard)
- nutrition: object with calories, protein, carbs, fat"#,
        ingredients.join(", ")
    )
}
