//! GraphQL documents sent by the convenience operations on [`crate::MondayClient`].

pub const GET_COMPLEXITY: &str = r#"
query {
  complexity {
    before
    after
    query
    reset_in_x_seconds
  }
}
"#;

pub const GET_ITEM_BY_ID: &str = r#"
query GetItem($itemIds: [ID!]!) {
  items(ids: $itemIds) {
    id
    name
    state
    created_at
    updated_at
    creator_id
    board { id name }
    group { id title }
    column_values { id text value type }
    assets { id name url file_extension file_size created_at }
    updates {
      id
      body
      created_at
      creator_id
      assets { id name url }
    }
    subitems {
      id
      name
      column_values { id text value }
    }
  }
  complexity { before after }
}
"#;

pub const GET_BOARDS: &str = r#"
query GetBoards($limit: Int, $page: Int, $state: State, $workspace_ids: [ID!]) {
  boards(limit: $limit, page: $page, state: $state, workspace_ids: $workspace_ids) {
    id
    name
    description
    state
    board_kind
    items_count
    updated_at
    workspace { id name }
  }
  complexity { before after }
}
"#;

pub const GET_BOARD_COLUMNS: &str = r#"
query GetBoardColumns($boardIds: [ID!]!) {
  boards(ids: $boardIds) {
    id
    name
    columns { id title type settings_str }
  }
  complexity { before after }
}
"#;

pub const GET_BOARD_ITEMS: &str = r#"
query GetBoardItems($boardIds: [ID!]!, $limit: Int, $cursor: String) {
  boards(ids: $boardIds) {
    id
    name
    items_page(limit: $limit, cursor: $cursor) {
      cursor
      items {
        id
        name
        state
        created_at
        updated_at
        creator { id name }
        group { id title }
        column_values { id text type }
      }
    }
  }
  complexity { before after }
}
"#;

pub const GET_NEXT_ITEMS_PAGE: &str = r#"
query GetNextItemsPage($cursor: String!, $limit: Int) {
  next_items_page(cursor: $cursor, limit: $limit) {
    cursor
    items {
      id
      name
      state
      created_at
      updated_at
      creator { id name }
      group { id title }
      column_values { id text type }
    }
  }
  complexity { before after }
}
"#;

pub const CREATE_ITEM: &str = r#"
mutation CreateItem($boardId: ID!, $groupId: String, $itemName: String!, $columnValues: JSON) {
  create_item(
    board_id: $boardId
    group_id: $groupId
    item_name: $itemName
    column_values: $columnValues
  ) {
    id
    name
    created_at
  }
}
"#;

pub const CREATE_SUBITEM: &str = r#"
mutation CreateSubitem($parentItemId: ID!, $itemName: String!, $columnValues: JSON) {
  create_subitem(
    parent_item_id: $parentItemId
    item_name: $itemName
    column_values: $columnValues
  ) {
    id
    name
    board { id }
  }
}
"#;

pub const CREATE_UPDATE: &str = r#"
mutation CreateUpdate($itemId: ID!, $body: String!) {
  create_update(item_id: $itemId, body: $body) {
    id
    body
    created_at
  }
}
"#;

pub const CHANGE_COLUMN_VALUE: &str = r#"
mutation ChangeColumnValue($boardId: ID!, $itemId: ID!, $columnId: String!, $value: JSON!) {
  change_column_value(
    board_id: $boardId
    item_id: $itemId
    column_id: $columnId
    value: $value
  ) {
    id
    name
  }
}
"#;

pub const GET_ITEM_SUBITEMS: &str = r#"
query GetItemSubitems($itemIds: [ID!]!) {
  items(ids: $itemIds) {
    id
    name
    board { id name }
    subitems {
      id
      name
      state
      created_at
      updated_at
      creator { id name }
      board { id name }
      column_values { id text type }
    }
  }
  complexity { before after }
}
"#;

pub const GET_BOARD_GROUPS: &str = r#"
query GetBoardGroups($boardIds: [ID!]!) {
  boards(ids: $boardIds) {
    id
    name
    groups { id title color position }
  }
  complexity { before after }
}
"#;

pub const GET_WORKSPACES: &str = r#"
query GetWorkspaces($limit: Int, $ids: [ID!], $membership_kind: WorkspaceMembershipKind) {
  workspaces(limit: $limit, ids: $ids, membership_kind: $membership_kind) {
    id
    name
    kind
    description
    account_product { id kind }
  }
  complexity { before after }
}
"#;

pub const GET_DOC_BY_OBJECT_ID: &str = r#"
query GetDocByObjectId($objectIds: [ID!]) {
  docs(object_ids: $objectIds) {
    id
    object_id
  }
  complexity { before after }
}
"#;

/// Takes the internal doc id, not the `object_id` stored in a doc column.
pub const EXPORT_MARKDOWN_FROM_DOC: &str = r#"
query ExportMarkdownFromDoc($docId: ID!) {
  export_markdown_from_doc(docId: $docId) {
    success
    markdown
    error
  }
}
"#;

pub const GET_DOC_BLOCKS: &str = r#"
query GetDocBlocks($docIds: [ID!]!, $limit: Int, $page: Int) {
  docs(ids: $docIds) {
    id
    blocks(limit: $limit, page: $page) {
      id
      type
      content
    }
  }
}
"#;
