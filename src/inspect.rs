//! Inspect command - print the merged catalog of one or more bags

use anyhow::Result;
use prettytable::{Table, row};

use crate::catalog::TopicCatalog;
use crate::rosbags_io::RosbagReader;
use crate::selection::Grouping;
use crate::session::Session;

/// Load `bags` and print their catalog as a table or JSON.
pub fn inspect_bags(bags: &[String], grouping: Grouping, json: bool) -> Result<()> {
    let mut session = Session::new();
    let catalog = session.load(bags, &RosbagReader)?;

    if json {
        println!("{}", serde_json::to_string_pretty(catalog)?);
        return Ok(());
    }

    println!(
        "Bags: {}, Topics: {}, Message types: {}\n",
        bags.len(),
        catalog.all_topics().len(),
        catalog.all_message_types().len()
    );
    catalog_table(catalog, grouping).printstd();
    print_conflicts(catalog);
    Ok(())
}

/// Rows ordered by message type then topic, or one row per message type.
pub fn catalog_table(catalog: &TopicCatalog, grouping: Grouping) -> Table {
    let mut table = Table::new();
    match grouping {
        Grouping::ByTopic => {
            table.set_titles(row!["Topic", "Message Type"]);
            for ty in catalog.types_sorted() {
                for topic in catalog.topics_for_type(&ty) {
                    table.add_row(row![topic, ty]);
                }
            }
        }
        Grouping::ByMessageType => {
            table.set_titles(row!["Message Type", "Topics"]);
            for ty in catalog.types_sorted() {
                let topics: Vec<String> = catalog.topics_for_type(&ty).into_iter().collect();
                table.add_row(row![ty, topics.join(",")]);
            }
        }
    }
    table
}

pub fn print_conflicts(catalog: &TopicCatalog) {
    for c in catalog.conflicts() {
        eprintln!(
            "[bagfilter][warn] {} was {} in an earlier bag; using {} from {}",
            c.topic,
            c.shadowed_type,
            c.winning_type,
            c.bag.display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rosbags_io::BagDescriptor;

    fn catalog() -> TopicCatalog {
        let bag = BagDescriptor::new(
            "/d/a.bag",
            [
                ("/cam/left", "sensor_msgs/Image"),
                ("/cam/right", "sensor_msgs/Image"),
                ("/imu", "sensor_msgs/Imu"),
            ]
            .iter()
            .map(|(t, ty)| (t.to_string(), ty.to_string()))
            .collect(),
        );
        TopicCatalog::build(&[bag])
    }

    #[test]
    fn test_table_by_topic_has_row_per_topic() {
        let table = catalog_table(&catalog(), Grouping::ByTopic);
        assert_eq!(table.len(), 3);
        let rendered = table.to_string();
        let left = rendered.find("/cam/left").unwrap();
        let imu = rendered.find("/imu").unwrap();
        assert!(left < imu);
    }

    #[test]
    fn test_table_by_type_joins_topics() {
        let table = catalog_table(&catalog(), Grouping::ByMessageType);
        assert_eq!(table.len(), 2);
        assert!(table.to_string().contains("/cam/left,/cam/right"));
    }
}
