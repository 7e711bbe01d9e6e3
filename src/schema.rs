// Diesel schema for the normalized missile store.

diesel::table! {
    countries (id) {
        id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    purposes (id) {
        id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    base_types (id) {
        id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    warhead_types (id) {
        id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    guidance_systems (id) {
        id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    missiles (id) {
        id -> Integer,
        name -> Text,
        detail_page_url -> Text,
        index_page_url -> Text,
        page_number -> Integer,
        range_km -> Nullable<Integer>,
        year_developed -> Nullable<Integer>,
        description -> Nullable<Text>,
        country_id -> Nullable<Integer>,
        purpose_id -> Nullable<Integer>,
        base_type_id -> Nullable<Integer>,
        warhead_type_id -> Nullable<Integer>,
        guidance_system_id -> Nullable<Integer>,
        is_detailed -> Bool,
        scraped_at -> Text,
    }
}

diesel::table! {
    missile_detailed_data (id) {
        id -> Integer,
        missile_id -> Integer,
        detailed_filename -> Nullable<Text>,
        range_detailed -> Nullable<Text>,
        speed -> Nullable<Text>,
        weight -> Nullable<Text>,
        length -> Nullable<Text>,
        diameter -> Nullable<Text>,
        accuracy -> Nullable<Text>,
        flight_altitude -> Nullable<Text>,
        other_characteristics -> Nullable<Text>,
        scraped_at -> Text,
    }
}

diesel::table! {
    structured_content (id) {
        id -> Integer,
        missile_id -> Integer,
        field_name -> Text,
        field_label -> Nullable<Text>,
        field_text -> Nullable<Text>,
    }
}

diesel::table! {
    structured_content_links (id) {
        id -> Integer,
        structured_content_id -> Integer,
        link_url -> Text,
        link_text -> Nullable<Text>,
    }
}

diesel::table! {
    characteristics (id) {
        id -> Integer,
        missile_id -> Integer,
        field_name -> Text,
        field_value -> Text,
    }
}

diesel::table! {
    missile_images (id) {
        id -> Integer,
        missile_id -> Integer,
        image_url -> Text,
        image_type -> Nullable<Text>,
    }
}

diesel::table! {
    import_sessions (id) {
        id -> Integer,
        session_name -> Text,
        start_time -> Text,
        end_time -> Nullable<Text>,
        total_missiles -> Nullable<Integer>,
        total_detailed -> Nullable<Integer>,
        status -> Text,
    }
}

diesel::joinable!(missiles -> countries (country_id));
diesel::joinable!(missiles -> purposes (purpose_id));
diesel::joinable!(missiles -> base_types (base_type_id));
diesel::joinable!(missiles -> warhead_types (warhead_type_id));
diesel::joinable!(missiles -> guidance_systems (guidance_system_id));
diesel::joinable!(missile_detailed_data -> missiles (missile_id));
diesel::joinable!(structured_content -> missiles (missile_id));
diesel::joinable!(structured_content_links -> structured_content (structured_content_id));
diesel::joinable!(characteristics -> missiles (missile_id));
diesel::joinable!(missile_images -> missiles (missile_id));

diesel::allow_tables_to_appear_in_same_query!(
    countries,
    purposes,
    base_types,
    warhead_types,
    guidance_systems,
    missiles,
    missile_detailed_data,
    structured_content,
    structured_content_links,
    characteristics,
    missile_images,
    import_sessions,
);
