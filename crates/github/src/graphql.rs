use anyhow::{Result, anyhow, bail};
use graphql_client::{QueryBody, Response};
use octocrab::Octocrab;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

const MINIMIZE_COMMENT_OPERATION: &str = "MinimizeComment";
const MINIMIZE_COMMENT_MUTATION: &str = r#"
mutation MinimizeComment($comment: ID!) {
  minimizeComment(input: {classifier: OUTDATED, subjectId: $comment}) {
    minimizedComment {
      isMinimized
    }
  }
}
"#;

#[derive(Serialize)]
struct MinimizeCommentVariables<'a> {
    comment: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MinimizeCommentData {
    minimize_comment: Option<MinimizeCommentPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MinimizeCommentPayload {
    minimized_comment: Option<MinimizedComment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MinimizedComment {
    is_minimized: bool,
}

async fn run_query<V: Serialize, T: DeserializeOwned>(
    client: &Octocrab,
    query: QueryBody<V>,
) -> Result<T> {
    let response: Response<T> = client.graphql(&query).await?;
    if let Some(errors) = response.errors {
        let message = errors.into_iter().map(|error| error.message).collect::<Vec<_>>().join("\n");
        bail!("GraphQL query failed: {message}");
    }
    response.data.ok_or_else(|| anyhow!("No data returned from GraphQL query"))
}

fn minimize_comment_query(node_id: &str) -> QueryBody<MinimizeCommentVariables<'_>> {
    QueryBody {
        variables: MinimizeCommentVariables { comment: node_id },
        query: MINIMIZE_COMMENT_MUTATION,
        operation_name: MINIMIZE_COMMENT_OPERATION,
    }
}

/// Minimize a comment with the `OUTDATED` classifier, returning whether it is now minimized.
pub async fn minimize_comment(client: &Octocrab, node_id: &str) -> Result<bool> {
    let data: MinimizeCommentData = run_query(client, minimize_comment_query(node_id)).await?;
    Ok(data
        .minimize_comment
        .and_then(|payload| payload.minimized_comment)
        .is_some_and(|comment| comment.is_minimized))
}
