use super::types::FixRequest;

pub const FIX_ROLE_INSTRUCTIONS: &str = r#"You are an AI code assistant helping to fix code issues.
Your task is to analyze the user's request and generate a specific code fix.
Provide the complete fixed code in a markdown code block."#;

pub const EMPTY_FILE_MARKER: &str = "(empty file)";

/// Serialize a fix request into the single prompt sent to the model.
///
/// Sections, in order: role, file metadata, current content, user request,
/// output format. The fence tag in the output format is the request's file
/// type so the selector can find the answer again.
pub fn build_fix_prompt(request: &FixRequest) -> String {
    let mut prompt = String::with_capacity(request.file_content.len() + 1024);

    prompt.push_str(FIX_ROLE_INSTRUCTIONS);
    prompt.push_str("\n\n");

    prompt.push_str("=== FILE METADATA ===\n");
    prompt.push_str(&format!("File Path: {}\n", request.file_path));
    prompt.push_str(&format!("File Type: {}\n\n", request.file_type));

    prompt.push_str("=== CURRENT FILE CONTENT ===\n");
    if request.file_content.trim().is_empty() {
        prompt.push_str(EMPTY_FILE_MARKER);
        prompt.push('\n');
    } else {
        prompt.push_str(&request.file_content);
        if !request.file_content.ends_with('\n') {
            prompt.push('\n');
        }
    }
    prompt.push('\n');

    prompt.push_str("=== USER REQUEST ===\n");
    prompt.push_str(&request.user_message);
    prompt.push_str("\n\n");

    prompt.push_str("=== INSTRUCTIONS ===\n");
    prompt.push_str("1. Analyze the user's request and the current file content\n");
    prompt.push_str("2. Generate the complete fixed code\n");
    prompt.push_str(
        "3. Wrap your code in a markdown code block with the appropriate language identifier\n",
    );
    prompt.push_str("4. Use this format:\n");
    prompt.push_str(&format!(
        "```{}\n(your fixed code here)\n```\n",
        request.file_type
    ));
    prompt.push_str("5. Provide a brief explanation of the changes you made\n");

    prompt
}
