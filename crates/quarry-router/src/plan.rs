//! Per-role retrieval plans.

use quarry_config::RoutingConfig;
use quarry_core::{AnswerDetail, VisibilityFilter};

/// What the unstructured path searches and how deeply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalPlan {
    pub filter: VisibilityFilter,
    pub top_k: usize,
    pub detail: AnswerDetail,
}

impl RetrievalPlan {
    /// Documents to retrieve: the administrative depth for admins,
    /// otherwise the depth for the requested detail.
    #[must_use]
    pub const fn depth(routing: &RoutingConfig, is_admin: bool, detail: AnswerDetail) -> usize {
        if is_admin {
            return routing.admin_top_k;
        }
        match detail {
            AnswerDetail::Brief => routing.brief_top_k,
            AnswerDetail::Extended => routing.extended_top_k,
        }
    }

    /// The same depth and detail over a different scope.
    #[must_use]
    pub fn with_filter(&self, filter: VisibilityFilter) -> Self {
        Self {
            filter,
            top_k: self.top_k,
            detail: self.detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_by_role_and_detail() {
        let routing = RoutingConfig::default();
        assert_eq!(RetrievalPlan::depth(&routing, true, AnswerDetail::Brief), 3);
        assert_eq!(RetrievalPlan::depth(&routing, false, AnswerDetail::Brief), 2);
        assert_eq!(RetrievalPlan::depth(&routing, false, AnswerDetail::Extended), 3);
    }
}
