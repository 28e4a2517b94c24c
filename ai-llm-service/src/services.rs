pub mod bedrock_claude_service;
pub mod gemini_service;
