//! WIQL and JMESPath query text.
//!
//! Reference:
//! - https://learn.microsoft.com/en-us/azure/devops/boards/queries/wiql-syntax

pub const WIQL_ASSIGNED_TO_ME: &str = "SELECT * FROM workitems WHERE [System.AssignedTo] = @me AND [System.CreatedDate] >= @Today - 90 ORDER BY [System.CreatedDate] DESC";

pub const WIQL_EVER_ASSIGNED_TO_ME: &str = "SELECT * FROM workitems WHERE EVER [System.AssignedTo] = @me AND [System.CreatedDate] >= @Today - 90 ORDER BY [System.CreatedDate] DESC";

pub const WIQL_ALL: &str = "SELECT * FROM workitems WHERE [System.CreatedDate] >= @Today - 90 ORDER BY [System.CreatedDate] DESC";

pub const WORK_ITEMS: &str = concat!(
    "[].{",
    "Id: fields.\"System.Id\", ",
    "\"Work Item Type\": fields.\"System.WorkItemType\", ",
    "\"Title\": fields.\"System.Title\", ",
    "\"Assigned To\": fields.\"System.AssignedTo\".displayName, ",
    "\"Assigned To Unique Name\": fields.\"System.AssignedTo\".uniqueName, ",
    "\"State\": fields.\"System.State\", ",
    "\"Tags\": fields.\"System.Tags\", ",
    "\"Iteration Path\": fields.\"System.IterationPath\", ",
    "\"CreatedDate\": fields.\"System.CreatedDate\", ",
    "\"CreatedBy\": fields.\"System.CreatedBy\".displayName, ",
    "\"ChangedDate\": fields.\"System.ChangedDate\", ",
    "\"ChangedBy\": fields.\"System.ChangedBy\".displayName, ",
    "\"Description\": fields.\"System.Description\"",
    "}"
);

pub const WORK_ITEM_DETAIL: &str = concat!(
    "{",
    "\"Repro Steps\": fields.\"Microsoft.VSTS.TCM.ReproSteps\", ",
    "\"System.AreaPath\": fields.\"System.AreaPath\", ",
    "\"Acceptance Criteria\": fields.\"Microsoft.VSTS.Common.AcceptanceCriteria\", ",
    "\"Board Column\": fields.\"System.BoardColumn\", ",
    "\"Board Column Done\": fields.\"System.BoardColumnDone\", ",
    "\"Comment Count\": fields.\"System.CommentCount\", ",
    "\"Latest Comment\": fields.\"System.History\", ",
    "\"PR refs\": relations[?attributes.name=='Pull Request'].url, ",
    "\"Priority\": fields.\"Microsoft.VSTS.Common.Priority\", ",
    "\"Severity\": fields.\"Microsoft.VSTS.Common.Severity\"",
    "}"
);

macro_rules! pull_request_projection {
    () => {
        concat!(
            "{",
            "\"Title\": title, ",
            "\"Status\": status, ",
            "\"ID\": pullRequestId, ",
            "\"Author\": createdBy.displayName, ",
            "\"Author Unique Name\": createdBy.uniqueName, ",
            "\"Created Date\": creationDate, ",
            "\"Description\": description, ",
            "\"Is Draft\": isDraft, ",
            "\"Labels\": labels, ",
            "\"Merge Failure Message\": mergeFailureMessage, ",
            "\"Merge Status\": mergeStatus, ",
            "\"Repository\": repository.name, ",
            "\"Repository URL\": repository.webUrl, ",
            "\"Project\": repository.project.name, ",
            "\"Reviewers\": reviewers[].displayName, ",
            "\"Reviewers Votes\": reviewers[].vote, ",
            "\"Source Ref Name\": sourceRefName, ",
            "\"Target Ref Name\": targetRefName, ",
            "\"Work Item Refs\": workItemRefs[].id, ",
            "\"Closed By\": closedBy.displayName, ",
            "\"Closed Date\": closedDate",
            "}"
        )
    };
}

pub const PULL_REQUEST: &str = pull_request_projection!();

pub const PULL_REQUESTS: &str = concat!("[].", pull_request_projection!());

pub const USER_PROFILE: &str =
    "{\"id\": id, \"displayName\": displayName, \"mail\": mail, \"givenName\": givenName, \"surname\": surname}";

pub const PIPELINE_DEFINITIONS: &str = "[].{id:id, name:name, path:path, status:queueStatus, defaultQueue:queue.name, project:project.name, author:authoredBy.displayName}";

pub const PIPELINE_RUNS: &str = concat!(
    "[].{id:id, buildNumber:buildNumber, definitionId: definition.id, ",
    "definitionName: definition.name, finishTime: finishTime, keepForever:keepForever, ",
    "queue:queue.name, queueTime:queueTime, reason:reason, ",
    "requestedFor:requestedFor.displayName, requestedForUniqueName:requestedFor.uniqueName, ",
    "result:result, sourceBranch:sourceBranch, sourceVersion:sourceVersion, ",
    "startTime:startTime, status:status, logsUrl:logs.url, ",
    "projectId:project.id, projectUrl:project.url}"
);

pub const PIPELINE_RUN_DETAIL: &str = "{tags:tags, triggerInfo:triggerInfo, templateParameters:templateParameters, retainedByRelease:retainedByRelease}";
