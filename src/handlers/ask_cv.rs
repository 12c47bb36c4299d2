use crate::protocol::{AskCvParams, ToolResult};
use crate::query;
use crate::resume::Resume;

/// Handle an `ask_cv` tool call. Side-effect-free; the query engine never
/// fails, so this always produces a text result.
pub async fn handle(params: AskCvParams, resume: &Resume) -> ToolResult {
    ToolResult::text(query::answer(resume, &params.question))
}
