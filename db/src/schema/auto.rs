table! {
    translations (code) {
        code -> Text,
        name -> Text,
    }
}

table! {
    verses (translation, ordinal) {
        translation -> Text,
        ordinal -> Integer,
        book -> Integer,
        chapter -> Integer,
        verse -> Integer,
        words -> Text,
    }
}

joinable!(verses -> translations (translation));

allow_tables_to_appear_in_same_query!(
    translations,
    verses,
);
