//! Esquema Diesel (generado manualmente). Reemplazable con `diesel print-schema`.

diesel::table! {
    workflow_states (entity_type, name) {
        entity_type -> Text,
        name -> Text,
        label -> Text,
        ord -> Integer,
        is_final -> Bool,
    }
}

diesel::table! {
    workflow_transitions (id) {
        id -> Text,
        entity_type -> Text,
        from_state -> Text,
        to_state -> Text,
        allowed_roles -> Jsonb,
        owner_override -> Bool,
        notify -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    workflow_entities (id) {
        id -> Uuid,
        entity_type -> Text,
        title -> Text,
        owner_user_id -> Uuid,
        current_state -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    workflow_history (seq) {
        seq -> BigInt,
        entity_type -> Text,
        entity_id -> Uuid,
        from_state -> Nullable<Text>,
        to_state -> Text,
        transition_id -> Nullable<Text>,
        actor_user_id -> Uuid,
        notes -> Text,
        ts -> Timestamptz,
    }
}

diesel::table! {
    notifications (id) {
        id -> Uuid,
        recipient_user_id -> Uuid,
        kind -> Text,
        title -> Text,
        message -> Text,
        entity_type -> Text,
        entity_id -> Uuid,
        is_read -> Bool,
        read_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    directory_users (user_id) {
        user_id -> Uuid,
        display_name -> Text,
        role -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    workflow_states,
    workflow_transitions,
    workflow_entities,
    workflow_history,
    notifications,
    directory_users,
);
