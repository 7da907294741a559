use serde::{Deserialize, Serialize};

use crate::catalog::get_service_by_id;
use crate::intent::analyze_message;
use crate::models::{
    ActionKind, ActionName, ActionOption, ClassificationResult, ExtractedEntities, Intent,
    PricingKind, ServiceCategory, ServiceOffering,
};

pub const CONTACT_EMAIL: &str = "okekewallace@gmail.com";

pub const SERVICES_PANEL_MESSAGE: &str = "Here are all our available services. Click on any service to learn more and get a customized quote.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantReply {
    pub text: String,
    pub actions: Vec<ActionOption>,
    pub classification: ClassificationResult,
}

/// Full free-text pipeline: classify, extract, then render text and buttons.
pub fn compose_reply(user_text: &str) -> AssistantReply {
    let classification = analyze_message(user_text);
    let text = generate_response(
        classification.intent,
        &classification.entities,
        user_text,
    );

    AssistantReply {
        text,
        actions: actions_for_intent(classification.intent),
        classification,
    }
}

pub fn generate_response(intent: Intent, entities: &ExtractedEntities, _source_text: &str) -> String {
    match intent {
        Intent::ServiceInquiry => {
            let names = entities
                .matched_service_ids
                .iter()
                .filter_map(|id| get_service_by_id(id))
                .map(|service| service.name.as_str())
                .collect::<Vec<_>>();

            if names.is_empty() {
                "LeadDevCorps offers comprehensive technology solutions including custom software development, AI/ML solutions, web and mobile applications, cloud infrastructure, and strategic technology consulting. Which area interests you most?".to_string()
            } else {
                format!(
                    "I'd be happy to tell you about our {} services! We specialize in cutting-edge technology solutions. Would you like detailed information about any specific service, or shall I provide an overview of our capabilities?",
                    names.join(" and ")
                )
            }
        }
        Intent::Pricing => "Our pricing varies based on project scope and requirements. We offer competitive rates with transparent pricing models. Would you like me to provide a detailed quote for a specific service? I can also schedule a consultation to discuss your budget and requirements.".to_string(),
        Intent::Booking => "I'd be delighted to help you get started! Let me gather some information to connect you with the right specialist and provide an accurate timeline and quote.".to_string(),
        Intent::Contact => format!(
            "You can reach our team directly at {CONTACT_EMAIL} or through this chat. I can also schedule a consultation call with one of our technical specialists. What would work best for you?"
        ),
        Intent::General => "LeadDevCorps is a leading AI systems development company specializing in innovative technology solutions. We help businesses transform through custom software, AI integration, and strategic technology consulting. Founded with a mission to deliver cutting-edge solutions that drive real business value. How can we help transform your business?".to_string(),
    }
}

pub fn generate_detailed_service_response(service: &ServiceOffering) -> String {
    let mut response = format!("## {}\n\n{}\n\n", service.name, service.description);
    response.push_str(&format!("**💰 Investment:** {}\n", pricing_text(service)));
    response.push_str(&format!("**⏱️ Timeline:** {}\n\n", service.duration));
    response.push_str("**🚀 What's Included:**\n");

    for feature in &service.features {
        response.push_str(&format!("• {feature}\n"));
    }

    response.push_str("\n**Why Choose This Service?**\n");
    response.push_str(category_rationale(service.category));
    response.push_str("\n\n**Next Steps:**\nI can connect you with one of our specialists for a detailed consultation where we'll discuss your specific requirements and provide a customized proposal. Would you like to schedule a call?");

    response
}

pub fn generate_customization_response(service: &ServiceOffering) -> String {
    let mut response = format!(
        "Excellent! Let me help you customize the {} package to perfectly fit your needs.\n\n",
        service.name
    );
    response.push_str("**Customization Options Available:**\n\n");

    for (axis, detail) in customization_axes(service.category) {
        response.push_str(&format!("• **{axis}:** {detail}\n"));
    }

    response.push_str("\n**Pricing Flexibility:**\n");
    response.push_str("We offer flexible pricing models including fixed-price projects, time & materials, or retainer-based engagements. Our team will work with you to find the most cost-effective approach for your budget and timeline.\n\n");
    response.push_str("Let's schedule a consultation to discuss your specific requirements and create a tailored proposal that perfectly matches your needs and budget.");

    response
}

pub fn actions_for_intent(intent: Intent) -> Vec<ActionOption> {
    match intent {
        Intent::ServiceInquiry => vec![
            ActionOption::new(
                "services",
                "View All Services",
                ActionKind::Primary,
                ActionName::ShowServices,
            ),
            ActionOption::new(
                "consultation",
                "Get Custom Quote",
                ActionKind::Secondary,
                ActionName::BookConsultation,
            ),
        ],
        Intent::Pricing => vec![
            ActionOption::new(
                "quote",
                "Get Detailed Quote",
                ActionKind::Primary,
                ActionName::BookConsultation,
            ),
            ActionOption::new(
                "services",
                "Browse Services",
                ActionKind::Secondary,
                ActionName::ShowServices,
            ),
        ],
        Intent::Booking => vec![ActionOption::new(
            "book",
            "Start Booking Process",
            ActionKind::Primary,
            ActionName::BookConsultation,
        )],
        Intent::Contact | Intent::General => Vec::new(),
    }
}

pub fn service_detail_actions(service_id: &str) -> Vec<ActionOption> {
    vec![
        ActionOption::new(
            "book",
            "Book Consultation",
            ActionKind::Primary,
            ActionName::BookConsultation,
        ),
        ActionOption::new(
            "customize",
            "Customize Quote",
            ActionKind::Secondary,
            ActionName::CustomizeQuote,
        )
        .with_payload(service_id),
    ]
}

pub fn customization_actions() -> Vec<ActionOption> {
    vec![ActionOption::new(
        "book",
        "Discuss Requirements",
        ActionKind::Primary,
        ActionName::BookConsultation,
    )]
}

pub fn select_service_prompt(service: &ServiceOffering) -> String {
    format!(
        "Tell me more about {} and provide a detailed quote",
        service.name
    )
}

pub fn customize_quote_prompt(service: &ServiceOffering) -> String {
    format!(
        "I'd like to customize the {} package for my specific needs",
        service.name
    )
}

pub fn welcome_message() -> &'static str {
    "Welcome to LeadDevCorps! 👋 I'm your AI assistant, here to help you discover our cutting-edge technology solutions.

We specialize in:
• Custom Software Development
• AI & Machine Learning Solutions
• Web & Mobile Applications
• Cloud Infrastructure & DevOps
• Strategic Technology Consulting

How can I help transform your business today?"
}

pub fn welcome_actions() -> Vec<ActionOption> {
    vec![
        ActionOption::new(
            "services",
            "View All Services",
            ActionKind::Primary,
            ActionName::ShowServices,
        ),
        ActionOption::new(
            "consultation",
            "Book Consultation",
            ActionKind::Secondary,
            ActionName::BookConsultation,
        ),
    ]
}

/// Hourly rates print bare; everything else is a "starting at" figure with separators.
pub fn pricing_text(service: &ServiceOffering) -> String {
    match service.pricing.kind {
        PricingKind::Hourly => format!("${}/hour", service.pricing.amount),
        PricingKind::Fixed | PricingKind::Project => {
            format!("starting at ${}", group_thousands(service.pricing.amount))
        }
    }
}

fn group_thousands(amount: u32) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}

fn category_rationale(category: ServiceCategory) -> &'static str {
    match category {
        ServiceCategory::Development => "Our development team uses cutting-edge technologies and follows industry best practices to deliver scalable, maintainable solutions. We provide full project transparency with regular updates and demos.",
        ServiceCategory::Ai => "We leverage the latest AI/ML frameworks and have deep expertise in neural networks, deep learning, and natural language processing. Our AI solutions are designed to provide measurable business value and ROI.",
        ServiceCategory::Consulting => "Our senior consultants have 10+ years of experience helping companies navigate complex technical challenges. We provide actionable insights and strategic roadmaps tailored to your business goals.",
        ServiceCategory::Infrastructure => "We specialize in cloud-native architectures and DevOps best practices. Our infrastructure solutions are designed for scalability, security, and cost-effectiveness.",
    }
}

fn customization_axes(category: ServiceCategory) -> [(&'static str, &'static str); 5] {
    match category {
        ServiceCategory::Development => [
            (
                "Technology Stack",
                "Choose from React/Vue/Angular, Node.js/Python/Java, PostgreSQL/MongoDB",
            ),
            (
                "Integrations",
                "Third-party APIs, payment gateways, CRM systems",
            ),
            ("Deployment", "Cloud platform preference (AWS/Azure/GCP)"),
            ("Team Size", "Scale team based on timeline requirements"),
            (
                "Support Level",
                "Choose from basic, standard, or premium support packages",
            ),
        ],
        ServiceCategory::Ai => [
            (
                "AI Models",
                "Custom training vs pre-trained model fine-tuning",
            ),
            (
                "Data Sources",
                "Integration with your existing data systems",
            ),
            ("Deployment", "Cloud, on-premise, or hybrid solutions"),
            ("Performance", "Accuracy vs speed optimization preferences"),
            (
                "Compliance",
                "GDPR, HIPAA, or other regulatory requirements",
            ),
        ],
        ServiceCategory::Consulting => [
            (
                "Focus Areas",
                "Architecture, security, performance, or team training",
            ),
            ("Engagement Model", "On-site, remote, or hybrid consulting"),
            ("Duration", "Short-term assessment or long-term partnership"),
            ("Deliverables", "Reports, documentation, training materials"),
            (
                "Team Access",
                "Direct access to senior architects and specialists",
            ),
        ],
        ServiceCategory::Infrastructure => [
            ("Cloud Provider", "AWS, Azure, GCP, or multi-cloud setup"),
            (
                "Scalability",
                "Auto-scaling requirements and traffic patterns",
            ),
            ("Security", "Compliance requirements and security protocols"),
            (
                "Monitoring",
                "Logging, alerting, and performance monitoring tools",
            ),
            (
                "Backup & Recovery",
                "Disaster recovery and data backup strategies",
            ),
        ],
    }
}
