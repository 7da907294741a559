use once_cell::sync::Lazy;

use crate::models::{Pricing, PricingKind, ServiceCategory, ServiceOffering};

static SERVICES: Lazy<Vec<ServiceOffering>> = Lazy::new(|| {
    vec![
        offering(
            "custom-software",
            "Custom Software Development",
            "End-to-end custom software solutions tailored to your business needs",
            ServiceCategory::Development,
            (PricingKind::Project, 15_000),
            "8-16 weeks",
            &[
                "Full-stack development",
                "Modern tech stack (React, Node.js, Python)",
                "Database design & optimization",
                "API development & integration",
                "Testing & quality assurance",
                "6 months post-launch support",
            ],
        ),
        offering(
            "ai-solutions",
            "AI & Machine Learning Solutions",
            "Intelligent systems powered by cutting-edge AI technology",
            ServiceCategory::Ai,
            (PricingKind::Project, 25_000),
            "12-20 weeks",
            &[
                "Custom AI model development",
                "Natural Language Processing",
                "Computer Vision solutions",
                "Predictive analytics",
                "AI chatbots & virtual assistants",
                "MLOps & model deployment",
            ],
        ),
        offering(
            "web-development",
            "Web Application Development",
            "Responsive, scalable web applications with modern frameworks",
            ServiceCategory::Development,
            (PricingKind::Project, 8_000),
            "6-12 weeks",
            &[
                "Responsive design",
                "Progressive Web App (PWA)",
                "SEO optimization",
                "Performance optimization",
                "Cross-browser compatibility",
                "Content management system",
            ],
        ),
        offering(
            "mobile-development",
            "Mobile App Development",
            "Native and cross-platform mobile applications",
            ServiceCategory::Development,
            (PricingKind::Project, 20_000),
            "10-16 weeks",
            &[
                "iOS & Android development",
                "React Native / Flutter",
                "App Store optimization",
                "Push notifications",
                "Offline functionality",
                "Analytics integration",
            ],
        ),
        offering(
            "cloud-infrastructure",
            "Cloud Infrastructure & DevOps",
            "Scalable cloud solutions and automated deployment pipelines",
            ServiceCategory::Infrastructure,
            (PricingKind::Hourly, 150),
            "4-8 weeks",
            &[
                "AWS/Azure/GCP setup",
                "CI/CD pipeline implementation",
                "Container orchestration",
                "Monitoring & logging",
                "Security best practices",
                "Cost optimization",
            ],
        ),
        offering(
            "tech-consulting",
            "Technology Consulting",
            "Strategic technology guidance and architecture planning",
            ServiceCategory::Consulting,
            (PricingKind::Hourly, 200),
            "2-6 weeks",
            &[
                "Technology stack assessment",
                "Architecture design",
                "Digital transformation strategy",
                "Code review & optimization",
                "Team training & mentoring",
                "Technical due diligence",
            ],
        ),
    ]
});

/// All offerings in declaration order.
pub fn list_services() -> &'static [ServiceOffering] {
    SERVICES.as_slice()
}

pub fn get_service_by_id(id: &str) -> Option<&'static ServiceOffering> {
    SERVICES.iter().find(|service| service.id == id)
}

pub fn services_by_category(category: ServiceCategory) -> Vec<&'static ServiceOffering> {
    SERVICES
        .iter()
        .filter(|service| service.category == category)
        .collect()
}

fn offering(
    id: &str,
    name: &str,
    description: &str,
    category: ServiceCategory,
    (kind, amount): (PricingKind, u32),
    duration: &str,
    features: &[&str],
) -> ServiceOffering {
    ServiceOffering {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category,
        pricing: Pricing {
            kind,
            amount,
            currency: "USD".to_string(),
        },
        duration: duration.to_string(),
        features: features.iter().map(|feature| feature.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn ids_are_unique_and_amounts_positive() {
        let ids = list_services()
            .iter()
            .map(|service| service.id.as_str())
            .collect::<HashSet<_>>();
        assert_eq!(ids.len(), list_services().len());
        assert!(list_services().iter().all(|service| service.pricing.amount > 0));
    }

    #[test]
    fn lookup_by_id() {
        let service = get_service_by_id("ai-solutions").expect("ai-solutions exists");
        assert_eq!(service.name, "AI & Machine Learning Solutions");
        assert!(get_service_by_id("not-a-real-id").is_none());
    }

    #[test]
    fn category_filter_keeps_declaration_order() {
        let development = services_by_category(ServiceCategory::Development)
            .into_iter()
            .map(|service| service.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            development,
            vec!["custom-software", "web-development", "mobile-development"]
        );
    }
}
